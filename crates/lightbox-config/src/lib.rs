pub mod config;
pub mod environment;
pub mod error;
pub mod lightbox;
pub mod page;
pub mod templates;

pub use config::{Config, Strategy, ThemeConfig};
pub use environment::BuildEnvironment;
pub use error::ConfigError;
pub use lightbox::{CaptionPosition, Effect, LightboxConfig, SlideEffect};
pub use page::{EffectiveConfig, PageMeta, PageState};
