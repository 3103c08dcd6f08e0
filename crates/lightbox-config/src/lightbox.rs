use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
  config::{parse_bool, parse_enum},
  error::ConfigError,
};

/// Declares a closed set of lowercase string options with the conversions the
/// config layer needs: serde, [`FromStr`], [`fmt::Display`] and `as_str`.
macro_rules! string_enum {
  (
    $(#[$meta:meta])*
    $name:ident {
      $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
    }
    default = $default:ident
  ) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum $name {
      $(
        $(#[$vmeta])*
        #[serde(rename = $text)]
        $variant,
      )+
    }

    impl $name {
      /// All accepted spellings, in declaration order.
      pub const VARIANTS: &'static [&'static str] = &[$($text),+];

      #[must_use]
      pub const fn as_str(self) -> &'static str {
        match self {
          $(Self::$variant => $text,)+
        }
      }
    }

    impl Default for $name {
      fn default() -> Self {
        Self::$default
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl FromStr for $name {
      type Err = String;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
          $($text => Ok(Self::$variant),)+
          other => {
            Err(format!(
              "'{other}' is not one of {}",
              Self::VARIANTS.join(", ")
            ))
          },
        }
      }
    }
  };
}

string_enum! {
  /// Transition used when the viewer opens or closes.
  Effect {
    Zoom => "zoom",
    Fade => "fade",
    None => "none",
  }
  default = Zoom
}

string_enum! {
  /// Transition between slides of a gallery.
  SlideEffect {
    Slide => "slide",
    Zoom => "zoom",
    Fade => "fade",
    None => "none",
  }
  default = Slide
}

string_enum! {
  /// Where the viewer renders an image's title and description.
  CaptionPosition {
    Bottom => "bottom",
    Top => "top",
    Left => "left",
    Right => "right",
  }
  default = Bottom
}

/// Global lightbox options, shared read-only by every page of a build.
///
/// Keys use the camelCase surface of the viewer (`slideEffect`,
/// `skipClasses`, ...); the snake_case spelling of each multi-word key is
/// accepted as an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightboxConfig {
  /// Allow swiping between images on touch devices.
  #[serde(alias = "touch_navigation")]
  pub touch_navigation: bool,

  /// Wrap around at the ends of a gallery.
  #[serde(rename = "loop")]
  pub loop_gallery: bool,

  /// Open and close transition.
  pub effect: Effect,

  /// Transition between slides.
  #[serde(alias = "slide_effect")]
  pub slide_effect: SlideEffect,

  /// Value of `data-width` on every wrapped image.
  pub width: String,

  /// Value of `data-height` on every wrapped image.
  pub height: String,

  pub zoomable: bool,

  pub draggable: bool,

  /// Classes that keep an image out of the viewer, in addition to the
  /// built-in emoji markers and `off-glb`.
  #[serde(alias = "skip_classes")]
  pub skip_classes: Vec<String>,

  /// Group images into light and dark galleries by their URL fragment.
  #[serde(alias = "auto_themed")]
  pub auto_themed: bool,

  /// Use the `alt` text as the title when no `data-title` is given.
  #[serde(alias = "auto_caption")]
  pub auto_caption: bool,

  #[serde(alias = "caption_position")]
  pub caption_position: CaptionPosition,

  /// Background painted behind the opened image.
  pub background: String,

  /// Drop shadow around the opened image.
  pub shadow: bool,

  /// Only images carrying the `on-glb` class are wrapped.
  pub manual: bool,
}

impl Default for LightboxConfig {
  fn default() -> Self {
    Self {
      touch_navigation: true,
      loop_gallery:     false,
      effect:           Effect::Zoom,
      slide_effect:     SlideEffect::Slide,
      width:            "100%".to_string(),
      height:           "auto".to_string(),
      zoomable:         true,
      draggable:        true,
      skip_classes:     Vec::new(),
      auto_themed:      false,
      auto_caption:     false,
      caption_position: CaptionPosition::Bottom,
      background:       "white".to_string(),
      shadow:           true,
      manual:           false,
    }
  }
}

/// Replaces each listed field of `$this` with the one from `$other` when the
/// latter was actually set, i.e. differs from the default.
macro_rules! take_if_set {
  ($this:ident, $other:ident, $defaults:ident, $($field:ident),+ $(,)?) => {
    $(
      if $other.$field != $defaults.$field {
        $this.$field = $other.$field;
      }
    )+
  };
}

impl LightboxConfig {
  /// Apply a single `lightbox.<key>=<value>` override.
  ///
  /// `key` is the part after `lightbox.`, in either camelCase or snake_case.
  /// `skipClasses` takes a comma-separated list and replaces the current one.
  ///
  /// # Errors
  ///
  /// Returns an error if the key is unknown or the value cannot be parsed as
  /// the field's type.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    let full_key = format!("lightbox.{key}");
    match key {
      "touchNavigation" | "touch_navigation" => {
        self.touch_navigation = parse_bool(&full_key, value)?;
      },
      "loop" => self.loop_gallery = parse_bool(&full_key, value)?,
      "effect" => self.effect = parse_enum(&full_key, value)?,
      "slideEffect" | "slide_effect" => {
        self.slide_effect = parse_enum(&full_key, value)?;
      },
      "width" => self.width = value.to_string(),
      "height" => self.height = value.to_string(),
      "zoomable" => self.zoomable = parse_bool(&full_key, value)?,
      "draggable" => self.draggable = parse_bool(&full_key, value)?,
      "skipClasses" | "skip_classes" => {
        self.skip_classes = value
          .split(',')
          .map(str::trim)
          .filter(|class| !class.is_empty())
          .map(String::from)
          .collect();
      },
      "autoThemed" | "auto_themed" => {
        self.auto_themed = parse_bool(&full_key, value)?;
      },
      "autoCaption" | "auto_caption" => {
        self.auto_caption = parse_bool(&full_key, value)?;
      },
      "captionPosition" | "caption_position" => {
        self.caption_position = parse_enum(&full_key, value)?;
      },
      "background" => self.background = value.to_string(),
      "shadow" => self.shadow = parse_bool(&full_key, value)?,
      "manual" => self.manual = parse_bool(&full_key, value)?,
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{full_key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }

  /// Merge another lightbox table into this one.
  ///
  /// Fields the other table leaves at their default keep this table's value;
  /// `skip_classes` is extended, skipping classes already present.
  pub fn merge(&mut self, other: Self) {
    let defaults = Self::default();
    for class in other.skip_classes {
      if !self.skip_classes.contains(&class) {
        self.skip_classes.push(class);
      }
    }

    take_if_set!(
      self,
      other,
      defaults,
      touch_navigation,
      loop_gallery,
      effect,
      slide_effect,
      width,
      height,
      zoomable,
      draggable,
      auto_themed,
      auto_caption,
      caption_position,
      background,
      shadow,
      manual,
    );
  }

  /// Whether the configured background differs from the viewer's white.
  #[must_use]
  pub fn has_custom_background(&self) -> bool {
    !self.background.trim().eq_ignore_ascii_case("white")
  }
}
