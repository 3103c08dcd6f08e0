//! Options object passed to the viewer constructor.
use std::io;

use lightbox_config::{Effect, LightboxConfig, SlideEffect};
use serde::Serialize;
use serde_json::ser::Formatter;

/// The subset of [`LightboxConfig`] the viewer reads at construction time.
///
/// Field order is the order of the rendered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerOptions {
  pub touch_navigation: bool,
  #[serde(rename = "loop")]
  pub loop_gallery:     bool,
  pub zoomable:         bool,
  pub draggable:        bool,
  pub open_effect:      Effect,
  pub close_effect:     Effect,
  pub slide_effect:     SlideEffect,
}

impl From<&LightboxConfig> for ViewerOptions {
  fn from(config: &LightboxConfig) -> Self {
    Self {
      touch_navigation: config.touch_navigation,
      loop_gallery:     config.loop_gallery,
      zoomable:         config.zoomable,
      draggable:        config.draggable,
      open_effect:      config.effect,
      close_effect:     config.effect,
      slide_effect:     config.slide_effect,
    }
  }
}

impl ViewerOptions {
  /// Render as a JavaScript object literal with `", "` and `": "` separators.
  ///
  /// # Errors
  ///
  /// Returns an error if serialization fails.
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    let mut serializer =
      serde_json::Serializer::with_formatter(Vec::new(), SpacedFormatter);
    self.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&serializer.into_inner()).into_owned())
  }
}

/// Compact JSON with a space after every separator.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
  fn begin_array_value<W>(
    &mut self,
    writer: &mut W,
    first: bool,
  ) -> io::Result<()>
  where
    W: ?Sized + io::Write,
  {
    if first { Ok(()) } else { writer.write_all(b", ") }
  }

  fn begin_object_key<W>(
    &mut self,
    writer: &mut W,
    first: bool,
  ) -> io::Result<()>
  where
    W: ?Sized + io::Write,
  {
    if first { Ok(()) } else { writer.write_all(b", ") }
  }

  fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
  where
    W: ?Sized + io::Write,
  {
    writer.write_all(b": ")
  }
}
