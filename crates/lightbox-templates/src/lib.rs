//! Static text embedded into the lightbox binary.
//!
//! Everything here is injected verbatim into generated pages or written out by
//! `lightbox init`, so the files under `templates/` are the single source of
//! truth for the viewer patch styles and the client-side snippets.

/// Default configuration written by `lightbox init --format toml`.
pub const DEFAULT_TOML_CONFIG: &str =
  include_str!("../templates/lightbox.toml");

/// Default configuration written by `lightbox init --format json`.
pub const DEFAULT_JSON_CONFIG: &str =
  include_str!("../templates/lightbox.json");

/// Overrides applied on every page that carries the viewer.
pub const PATCH_CSS: &str = include_str!("../templates/patch.css");

/// Extra rules for the Material theme, including the `slate` color scheme.
pub const MATERIAL_CSS: &str = include_str!("../templates/material.css");

/// Back-fills `href` on every `.glightbox` anchor from its image's `src`.
pub const PRIVACY_JS: &str = include_str!("../templates/privacy.js");
