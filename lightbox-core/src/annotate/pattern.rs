use std::sync::LazyLock;

use log::warn;
use regex::Regex;

use super::{AnnotateContext, ImageAnnotator, decide, process_safe};
use crate::types::{AnnotatedHtml, ImageDiagnostic, ImageElement, ImageOutcome};

/// Longest excerpt of a malformed tag kept in diagnostics.
const SNIPPET_LEN: usize = 80;

/// Scans the page text in one pass. Alternatives, first match wins:
///
/// - `raw`: comments and elements whose content is not markup;
/// - `anchor`: a link with everything inside it, passed through untouched;
/// - `image`: a well-formed `<img>` tag;
/// - `loose`: any other `<img` text, which is reported and left alone.
///
/// Element names end at whitespace, `/` or `>`, so custom elements such as
/// `<a-scene>` or `<img-comparison>` are plain text to the scanner.
#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(concat!(
    r"(?is)",
    r#"(?P<raw><!--.*?-->"#,
    r"|<script[\s/>].*?</script\s*>",
    r"|<style[\s/>].*?</style\s*>",
    r"|<textarea[\s/>].*?</textarea\s*>",
    r"|<title[\s/>].*?</title\s*>",
    r"|<noscript[\s/>].*?</noscript\s*>",
    r"|<template[\s/>].*?</template\s*>",
    r"|<iframe[\s/>].*?</iframe\s*>",
    r"|<xmp[\s/>].*?</xmp\s*>)",
    r"|(?P<anchor><a(?:[\s/][^>]*)?>.*?</a\s*>)",
    r#"|(?P<image><img(?:[\s/](?:[^<>"']|"[^"]*"|'[^']*')*)?>)"#,
    r"|(?P<loose><img(?:[\s/][^>]*>?|$))",
  ))
  .expect("Invalid tag regex")
});

/// A well-formed `<img>` tag on its own, used inside anchor spans.
#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static IMAGE_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?is)<img(?:[\s/](?:[^<>"']|"[^"]*"|'[^']*')*)?>"#)
    .expect("Invalid image tag regex")
});

/// The start of a malformed `<img`, up to the first `>`.
#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static LOOSE_TAG: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)<img[^>]*>?").expect("Invalid loose tag regex")
});

/// Another image tag start. Found inside a matched tag, it means an
/// unbalanced quote ran the match past the end of the real tag.
#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static NESTED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)<img[\s/>]").expect("Invalid nested image regex")
});

/// One attribute: name, then an optional double-quoted, single-quoted or bare
/// value.
#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#)
    .expect("Invalid attribute regex")
});

/// Splices anchor tags around image tags directly in the page text.
///
/// Everything outside the spliced anchors is copied through byte for byte,
/// including tags the scanner cannot read.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternAnnotator;

impl ImageAnnotator for PatternAnnotator {
  fn annotate(&self, html: &str, cx: &AnnotateContext<'_>) -> AnnotatedHtml {
    if html.is_empty() {
      return AnnotatedHtml::unchanged(html);
    }

    process_safe(cx.url, || annotate_text(html, cx))
      .unwrap_or_else(|| AnnotatedHtml::unchanged(html))
  }
}

fn annotate_text(html: &str, cx: &AnnotateContext<'_>) -> AnnotatedHtml {
  let mut out = String::with_capacity(html.len() + html.len() / 8);
  let mut outcomes = Vec::new();
  let mut last = 0;
  let mut pos = 0;

  while let Some(caps) = TAG_PATTERN.captures_at(html, pos) {
    let Some(whole) = caps.get(0) else {
      break;
    };
    pos = whole.end();

    if let Some(tag) = caps.name("image") {
      if NESTED_IMAGE.is_match(&tag.as_str()[1..]) {
        // An unbalanced quote ran past the real end of this tag
        pos = malformed(html, tag.start(), cx, &mut outcomes);
        continue;
      }

      let outcome = decide(&image_element(tag.as_str(), false), cx);
      if let ImageOutcome::Wrapped { attributes, .. } = &outcome {
        out.push_str(&html[last..tag.start()]);
        out.push_str(&attributes.open_tag());
        out.push_str(tag.as_str());
        out.push_str("</a>");
        last = tag.end();
      }
      outcomes.push(outcome);
    } else if let Some(anchor) = caps.name("anchor") {
      // Linked images are only recorded, the span is copied as is
      for tag in IMAGE_TAG.find_iter(anchor.as_str()) {
        outcomes.push(decide(&image_element(tag.as_str(), true), cx));
      }
    } else if let Some(loose) = caps.name("loose") {
      pos = malformed(html, loose.start(), cx, &mut outcomes);
    }
  }

  out.push_str(&html[last..]);
  AnnotatedHtml {
    html: out,
    outcomes,
  }
}

/// Record the malformed image tag starting at `start`.
///
/// Returns the offset just past the tag, up to its first `>`.
fn malformed(
  html: &str,
  start: usize,
  cx: &AnnotateContext<'_>,
  outcomes: &mut Vec<ImageOutcome>,
) -> usize {
  let tag = LOOSE_TAG
    .find_at(html, start)
    .map_or(&html[start..], |tag| tag.as_str());

  let snippet: String = tag.chars().take(SNIPPET_LEN).collect();
  warn!("{}: leaving malformed image tag unchanged: {snippet}", cx.url);
  outcomes.push(ImageOutcome::Unchanged(ImageDiagnostic::MalformedTag {
    snippet,
  }));

  start + tag.len()
}

/// Read the attributes of a complete `<img ...>` tag.
fn image_element(tag: &str, parent_is_anchor: bool) -> ImageElement {
  let body = tag
    .get(4..)
    .unwrap_or_default()
    .trim_end_matches('>');

  let attributes: Vec<(&str, String)> = ATTRIBUTE
    .captures_iter(body)
    .filter_map(|caps| {
      let name = caps.get(1)?.as_str();
      let value = caps
        .get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map(|value| {
          html_escape::decode_html_entities(value.as_str()).into_owned()
        })
        .unwrap_or_default();
      Some((name, value))
    })
    .collect();

  ImageElement::from_attributes(
    attributes
      .iter()
      .map(|(name, value)| (*name, value.as_str())),
    parent_is_anchor,
  )
}
