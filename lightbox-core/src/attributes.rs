use lightbox_config::{BuildEnvironment, EffectiveConfig};

use crate::types::{AnchorAttributes, ImageDiagnostic, ImageElement};

const LIGHT_MARKERS: [&str; 2] = ["#only-light", "#gh-light-mode-only"];
const DARK_MARKERS: [&str; 2] = ["#only-dark", "#gh-dark-mode-only"];

/// Derive the viewer attributes of an eligible image.
///
/// Explicit `data-*` attributes on the image take precedence over values
/// inferred from the configuration. `data-caption-position` is emitted as
/// `data-desc-position`, the name the viewer reads.
///
/// # Arguments
///
/// * `image` - The image to wrap
/// * `effective` - Options in effect for the page
/// * `env` - Facts about the host build
///
/// # Errors
///
/// Returns [`ImageDiagnostic::MissingSource`] if the image has no `src`. Such
/// an image has nothing to open and is left unchanged.
pub fn derive_attributes(
  image: &ImageElement,
  effective: &EffectiveConfig<'_>,
  env: &BuildEnvironment,
) -> Result<AnchorAttributes, ImageDiagnostic> {
  let src = image.src.trim();
  if src.is_empty() {
    return Err(ImageDiagnostic::MissingSource);
  }

  let title = image
    .data_attribute("data-title")
    .or_else(|| effective.auto_caption.then_some(image.alt.as_str()));

  let desc_position = image
    .data_attribute("data-caption-position")
    .unwrap_or_else(|| effective.caption_position().as_str());

  let gallery = effective
    .auto_themed
    .then(|| themed_gallery(src))
    .flatten()
    .or_else(|| image.data_attribute("data-gallery"));

  Ok(AnchorAttributes {
    href:          (!env.privacy).then(|| src.to_string()),
    width:         non_empty(effective.width()),
    height:        non_empty(effective.height()),
    title:         title.and_then(non_empty),
    description:   image.data_attribute("data-description").and_then(non_empty),
    desc_position: non_empty(desc_position),
    gallery:       gallery.and_then(non_empty),
  })
}

/// Gallery implied by a light or dark mode marker in the image URL.
fn themed_gallery(src: &str) -> Option<&'static str> {
  if LIGHT_MARKERS.iter().any(|marker| src.contains(marker)) {
    Some("light")
  } else if DARK_MARKERS.iter().any(|marker| src.contains(marker)) {
    Some("dark")
  } else {
    None
  }
}

fn non_empty(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}
