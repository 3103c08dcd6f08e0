//! Eligibility rules deciding which images open in the viewer.
use lightbox_config::EffectiveConfig;

use crate::types::ImageElement;

/// Classes that always keep an image out of the viewer: the emoji markers
/// emitted by `pymdownx.emoji` and the explicit opt-out.
pub const BUILTIN_SKIP_CLASSES: [&str; 4] =
  ["emojione", "twemoji", "gemoji", "off-glb"];

/// Class that opts an image in under manual mode.
pub const OPT_IN_CLASS: &str = "on-glb";

/// Why an image is not wrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
  /// Already inside a link.
  InsideAnchor,
  /// Carries a skip class, built-in or configured.
  SkipClass(String),
  /// Manual mode is active and the image lacks `on-glb`.
  NotOptedIn,
}

/// Classifier decision for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  Wrap,
  Skip(SkipReason),
}

impl Verdict {
  #[must_use]
  pub const fn is_eligible(&self) -> bool {
    matches!(self, Self::Wrap)
  }

  /// The image was turned away only for lacking the opt-in class.
  #[must_use]
  pub const fn requires_opt_in(&self) -> bool {
    matches!(self, Self::Skip(SkipReason::NotOptedIn))
  }
}

/// Decide whether `image` participates in the lightbox.
///
/// The first matching rule wins:
///
/// 1. an image inside an anchor is skipped;
/// 2. an image with a skip class is skipped, in every mode;
/// 3. under manual mode, unless the page set `glightbox: true`, only images
///    with `on-glb` are wrapped;
/// 4. everything else is wrapped.
#[must_use]
pub fn classify(
  image: &ImageElement,
  effective: &EffectiveConfig<'_>,
) -> Verdict {
  if image.parent_is_anchor {
    return Verdict::Skip(SkipReason::InsideAnchor);
  }

  if let Some(class) = image.classes.iter().find(|class| {
    BUILTIN_SKIP_CLASSES.contains(&class.as_str())
      || effective.skip_classes().contains(*class)
  }) {
    return Verdict::Skip(SkipReason::SkipClass(class.clone()));
  }

  if effective.requires_opt_in() && !image.has_class(OPT_IN_CLASS) {
    return Verdict::Skip(SkipReason::NotOptedIn);
  }

  Verdict::Wrap
}
