//! Per-page resolution of the lightbox configuration.
//!
//! A page's front-matter may switch the lightbox off, force it on under
//! manual mode, or flip captioning and theming for that page alone. The
//! result is an [`EffectiveConfig`] that borrows the global options and is
//! never mutated afterwards.

use serde_json::Value;

use crate::lightbox::{CaptionPosition, LightboxConfig};

/// Page front-matter as an arbitrary mapping.
pub type PageMeta = serde_json::Map<String, Value>;

/// `false` disables the page, `true` waives the `on-glb` requirement.
pub const META_ENABLE: &str = "glightbox";

/// Turns manual mode on for a single page.
pub const META_MANUAL: &str = "glightbox-manual";

pub const META_AUTO_CAPTION: &str = "glightbox.auto_caption";

pub const META_AUTO_THEMED: &str = "glightbox.auto_themed";

/// Outcome of resolving a page's metadata against the global options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState<'a> {
  /// The page opted out. Neither images nor assets are touched.
  Disabled,
  Enabled(EffectiveConfig<'a>),
}

impl<'a> PageState<'a> {
  /// Resolve the state of a page from the global options and its metadata.
  ///
  /// Absent keys and values that are not booleans fall back to the global
  /// options.
  #[must_use]
  pub fn resolve(global: &'a LightboxConfig, meta: Option<&PageMeta>) -> Self {
    let flag = |key: &str| meta.and_then(|meta| meta_flag(meta, key));

    let enabled = flag(META_ENABLE);
    if enabled == Some(false) {
      return Self::Disabled;
    }

    Self::Enabled(EffectiveConfig {
      global,
      auto_caption: flag(META_AUTO_CAPTION).unwrap_or(global.auto_caption),
      auto_themed: flag(META_AUTO_THEMED).unwrap_or(global.auto_themed),
      manual: global.manual || flag(META_MANUAL).unwrap_or(false),
      forced: enabled == Some(true),
    })
  }

  /// The effective configuration, unless the page is disabled.
  #[must_use]
  pub const fn effective(&self) -> Option<&EffectiveConfig<'a>> {
    match self {
      Self::Disabled => None,
      Self::Enabled(effective) => Some(effective),
    }
  }
}

/// Global options with one page's overrides applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveConfig<'a> {
  pub global: &'a LightboxConfig,

  /// Use `alt` as the title when no `data-title` is present.
  pub auto_caption: bool,

  /// Derive the gallery from light/dark URL markers.
  pub auto_themed: bool,

  /// Manual mode is active, globally or for this page.
  pub manual: bool,

  /// The page set `glightbox: true`.
  pub forced: bool,
}

impl<'a> EffectiveConfig<'a> {
  /// The global options with no page overrides.
  #[must_use]
  pub const fn global(global: &'a LightboxConfig) -> Self {
    Self {
      global,
      auto_caption: global.auto_caption,
      auto_themed: global.auto_themed,
      manual: global.manual,
      forced: false,
    }
  }

  /// Images must carry `on-glb` to be wrapped.
  ///
  /// Holds under manual mode unless the page forced the lightbox on.
  #[must_use]
  pub const fn requires_opt_in(&self) -> bool {
    self.manual && !self.forced
  }

  #[must_use]
  pub fn width(&self) -> &'a str {
    &self.global.width
  }

  #[must_use]
  pub fn height(&self) -> &'a str {
    &self.global.height
  }

  #[must_use]
  pub const fn caption_position(&self) -> CaptionPosition {
    self.global.caption_position
  }

  #[must_use]
  pub fn skip_classes(&self) -> &'a [String] {
    &self.global.skip_classes
  }
}

/// Read a boolean page flag. Front-matter written by hand often quotes
/// booleans, so `"true"` and `"false"` are accepted too.
fn meta_flag(meta: &PageMeta, key: &str) -> Option<bool> {
  match meta.get(key)? {
    Value::Bool(flag) => Some(*flag),
    Value::String(text) => {
      match text.trim().to_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
      }
    },
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use serde_json::json;

  use super::*;

  fn meta(value: Value) -> PageMeta {
    match value {
      Value::Object(map) => map,
      _ => PageMeta::new(),
    }
  }

  #[test]
  fn absent_meta_uses_global_options() {
    let global = LightboxConfig {
      auto_caption: true,
      ..LightboxConfig::default()
    };

    let state = PageState::resolve(&global, None);
    assert_eq!(state, PageState::Enabled(EffectiveConfig::global(&global)));
  }

  #[test]
  fn glightbox_false_disables_page() {
    let global = LightboxConfig::default();
    let meta = meta(json!({ "glightbox": false }));

    assert_eq!(PageState::resolve(&global, Some(&meta)), PageState::Disabled);
  }

  #[test]
  fn quoted_flags_are_accepted() {
    let global = LightboxConfig::default();
    let meta = meta(json!({ "glightbox": "false" }));

    assert_eq!(PageState::resolve(&global, Some(&meta)), PageState::Disabled);
  }

  #[test]
  fn page_flags_override_caption_and_theming() {
    let global = LightboxConfig {
      auto_caption: true,
      ..LightboxConfig::default()
    };
    let meta = meta(json!({
      "glightbox.auto_caption": false,
      "glightbox.auto_themed": true,
    }));

    let state = PageState::resolve(&global, Some(&meta));
    let effective = state.effective().unwrap();
    assert!(!effective.auto_caption);
    assert!(effective.auto_themed);
  }

  #[test]
  fn page_manual_turns_on_manual_mode() {
    let global = LightboxConfig::default();
    let meta = meta(json!({ "glightbox-manual": true }));

    let state = PageState::resolve(&global, Some(&meta));
    let effective = state.effective().unwrap();
    assert!(effective.manual);
    assert!(effective.requires_opt_in());
  }

  #[test]
  fn page_manual_false_keeps_global_manual() {
    let global = LightboxConfig {
      manual: true,
      ..LightboxConfig::default()
    };
    let meta = meta(json!({ "glightbox-manual": false }));

    let state = PageState::resolve(&global, Some(&meta));
    assert!(state.effective().unwrap().manual);
  }

  #[test]
  fn glightbox_true_waives_opt_in() {
    let global = LightboxConfig {
      manual: true,
      ..LightboxConfig::default()
    };
    let meta = meta(json!({ "glightbox": true }));

    let state = PageState::resolve(&global, Some(&meta));
    let effective = state.effective().unwrap();
    assert!(effective.manual);
    assert!(effective.forced);
    assert!(!effective.requires_opt_in());
  }

  #[test]
  fn non_boolean_values_are_ignored() {
    let global = LightboxConfig::default();
    let meta = meta(json!({ "glightbox": 0, "glightbox.auto_caption": [] }));

    let state = PageState::resolve(&global, Some(&meta));
    assert_eq!(state, PageState::Enabled(EffectiveConfig::global(&global)));
  }
}
