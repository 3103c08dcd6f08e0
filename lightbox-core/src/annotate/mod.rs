//! Document mutation: wrapping eligible images in viewer anchors.
//!
//! Two strategies implement [`ImageAnnotator`]. [`TreeAnnotator`] parses the
//! markup into a DOM and moves image nodes under new anchors, while
//! [`PatternAnnotator`] splices anchor tags around image tags in the raw text.
//! Both hand every image to [`decide`], so eligibility and attributes are the
//! same whichever strategy a build uses.
use std::sync::LazyLock;

use lightbox_config::{BuildEnvironment, EffectiveConfig, Strategy};
use log::{error, trace, warn};
use regex::Regex;

use crate::{
  attributes::derive_attributes,
  classify::{Verdict, classify},
  types::{AnnotatedHtml, ImageElement, ImageOutcome},
};

mod pattern;
mod tree;

pub use pattern::PatternAnnotator;
pub use tree::TreeAnnotator;

/// Everything an annotator needs to know about the page being rewritten.
#[derive(Debug, Clone, Copy)]
pub struct AnnotateContext<'a> {
  /// Page URL, used in log messages.
  pub url:       &'a str,
  pub effective: EffectiveConfig<'a>,
  pub env:       &'a BuildEnvironment,
}

/// Wraps every eligible image of a page in a lightbox anchor.
///
/// Implementations never fail: markup they cannot handle is returned as
/// found, with the problem recorded in the outcomes or logged.
pub trait ImageAnnotator: Send + Sync {
  /// Annotate a full document or a body fragment.
  fn annotate(&self, html: &str, cx: &AnnotateContext<'_>) -> AnnotatedHtml;
}

static TREE: TreeAnnotator = TreeAnnotator;
static PATTERN: PatternAnnotator = PatternAnnotator;

/// The annotator implementing `strategy`.
#[must_use]
pub fn annotator(strategy: Strategy) -> &'static dyn ImageAnnotator {
  match strategy {
    Strategy::Tree => &TREE,
    Strategy::Pattern => &PATTERN,
  }
}

/// Classify one image and, when eligible, derive its anchor attributes.
#[must_use]
pub fn decide(image: &ImageElement, cx: &AnnotateContext<'_>) -> ImageOutcome {
  match classify(image, &cx.effective) {
    Verdict::Skip(reason) => {
      trace!("{}: skipping image '{}': {reason:?}", cx.url, image.src);
      ImageOutcome::Skipped(reason)
    },
    Verdict::Wrap => {
      match derive_attributes(image, &cx.effective, cx.env) {
        Ok(attributes) => {
          ImageOutcome::Wrapped {
            src: image.src.clone(),
            attributes,
          }
        },
        Err(diagnostic) => {
          warn!("{}: leaving image unchanged: {diagnostic}", cx.url);
          ImageOutcome::Unchanged(diagnostic)
        },
      }
    },
  }
}

/// Run `f`, containing any panic to the page being processed.
///
/// Returns [`None`] if `f` panicked; the caller falls back to the page as it
/// was found.
pub fn process_safe<T, F>(url: &str, f: F) -> Option<T>
where
  F: FnOnce() -> T,
{
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
    Ok(value) => Some(value),
    Err(e) => {
      if let Some(error_msg) = e.downcast_ref::<String>() {
        error!("{url}: error annotating images: {error_msg}");
      } else if let Some(error_msg) = e.downcast_ref::<&str>() {
        error!("{url}: error annotating images: {error_msg}");
      } else {
        error!("{url}: unknown error occurred while annotating images");
      }
      None
    },
  }
}

#[allow(
  clippy::expect_used,
  reason = "This pattern is hardcoded and known to be valid"
)]
static DOCUMENT_START: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?is)^\s*(?:<!--.*?-->\s*)*<(?:!doctype|html[\s>])")
    .expect("Invalid document start regex")
});

/// The markup is a complete document rather than a body fragment.
#[must_use]
pub fn is_full_document(html: &str) -> bool {
  DOCUMENT_START.is_match(html.trim_start_matches('\u{feff}'))
}
