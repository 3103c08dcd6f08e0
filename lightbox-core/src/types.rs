//! Data passed between the classifier, the attribute deriver and the
//! annotators.
use std::collections::BTreeMap;

use thiserror::Error;

use crate::classify::SkipReason;

/// Class carried by every anchor that opens the viewer.
pub const ANCHOR_CLASS: &str = "glightbox";

/// An `<img>` found in a page, reduced to what the lightbox rules consult.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageElement {
  pub src:              String,
  pub alt:              String,
  pub classes:          Vec<String>,
  /// `data-*` attributes keyed by their full, lowercased name.
  pub data:             BTreeMap<String, String>,
  /// Some ancestor of the image is an `<a>` element.
  pub parent_is_anchor: bool,
}

impl ImageElement {
  /// Build an image from its attributes as they appear on the tag.
  ///
  /// Attribute names are matched case-insensitively and the first occurrence
  /// of a repeated attribute wins, as in an HTML parser.
  pub fn from_attributes<'s, I>(attributes: I, parent_is_anchor: bool) -> Self
  where
    I: IntoIterator<Item = (&'s str, &'s str)>,
  {
    let mut image = Self {
      parent_is_anchor,
      ..Self::default()
    };
    let mut seen: Vec<String> = Vec::new();

    for (name, value) in attributes {
      let name = name.to_ascii_lowercase();
      if seen.contains(&name) {
        continue;
      }

      match name.as_str() {
        "src" => image.src = value.to_string(),
        "alt" => image.alt = value.to_string(),
        "class" => {
          image.classes =
            value.split_ascii_whitespace().map(String::from).collect();
        },
        data if data.starts_with("data-") => {
          image.data.insert(name.clone(), value.to_string());
        },
        _ => {},
      }
      seen.push(name);
    }

    image
  }

  /// A `data-*` attribute, if present and not empty.
  #[must_use]
  pub fn data_attribute(&self, name: &str) -> Option<&str> {
    self
      .data
      .get(name)
      .map(String::as_str)
      .filter(|value| !value.is_empty())
  }

  #[must_use]
  pub fn has_class(&self, class: &str) -> bool {
    self.classes.iter().any(|c| c == class)
  }
}

/// Attributes of the anchor wrapped around an eligible image.
///
/// Every field is either absent or non-empty; the anchor never carries an
/// attribute with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorAttributes {
  /// Image source. Absent when the privacy integration resolves it on the
  /// client.
  pub href:          Option<String>,
  pub width:         Option<String>,
  pub height:        Option<String>,
  pub title:         Option<String>,
  pub description:   Option<String>,
  pub desc_position: Option<String>,
  pub gallery:       Option<String>,
}

impl AnchorAttributes {
  /// Attribute name and value pairs in output order.
  #[must_use]
  pub fn pairs(&self) -> Vec<(&'static str, &str)> {
    let optional = [
      ("data-width", &self.width),
      ("data-height", &self.height),
      ("data-title", &self.title),
      ("data-description", &self.description),
      ("data-desc-position", &self.desc_position),
      ("data-gallery", &self.gallery),
      ("href", &self.href),
    ];

    let mut pairs = vec![("class", ANCHOR_CLASS), ("data-type", "image")];
    pairs.extend(
      optional
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v))),
    );
    pairs
  }

  /// The opening `<a>` tag, with double-quoted and escaped values.
  #[must_use]
  pub fn open_tag(&self) -> String {
    let mut tag = String::from("<a");
    for (name, value) in self.pairs() {
      tag.push(' ');
      tag.push_str(name);
      tag.push_str("=\"");
      tag.push_str(&html_escape::encode_double_quoted_attribute(value));
      tag.push('"');
    }
    tag.push('>');
    tag
  }
}

/// Why an eligible image was left as found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageDiagnostic {
  #[error("image has no src attribute")]
  MissingSource,

  #[error("malformed image tag: {snippet}")]
  MalformedTag { snippet: String },
}

/// What happened to one image of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
  /// Wrapped in a lightbox anchor.
  Wrapped {
    src:        String,
    attributes: AnchorAttributes,
  },
  /// Not eligible for the lightbox.
  Skipped(SkipReason),
  /// Eligible, but left unchanged after a recoverable problem.
  Unchanged(ImageDiagnostic),
}

/// Annotated markup together with the per-image outcomes, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedHtml {
  pub html:     String,
  pub outcomes: Vec<ImageOutcome>,
}

impl AnnotatedHtml {
  /// The input, returned as is.
  #[must_use]
  pub fn unchanged(html: &str) -> Self {
    Self {
      html:     html.to_string(),
      outcomes: Vec::new(),
    }
  }

  #[must_use]
  pub fn wrapped_count(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|outcome| matches!(outcome, ImageOutcome::Wrapped { .. }))
      .count()
  }

  #[must_use]
  pub fn skipped_count(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|outcome| matches!(outcome, ImageOutcome::Skipped(_)))
      .count()
  }

  #[must_use]
  pub fn recovered_count(&self) -> usize {
    self
      .outcomes
      .iter()
      .filter(|outcome| matches!(outcome, ImageOutcome::Unchanged(_)))
      .count()
  }
}
