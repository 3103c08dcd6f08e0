//! Image lightbox post-processing for rendered HTML pages.
//!
//! Every eligible `<img>` of a page is wrapped in an anchor carrying the
//! viewer's `data-*` attributes, and the page gets the viewer stylesheet,
//! script and initialization. Pages are processed independently; a
//! [`LightboxProcessor`] holds only read-only state and can be shared across
//! threads.
//!
//! ```rust, ignore
//! let processor = LightboxProcessor::from_config(&config);
//! let page = PageContext { url: "guide/", meta: None };
//! let processed = processor.process_document(&html, &page);
//! ```
pub mod annotate;
pub mod attributes;
pub mod classify;
pub mod inject;
pub mod options;
pub mod processor;
pub mod types;
pub mod url;

pub use annotate::{
  AnnotateContext,
  ImageAnnotator,
  PatternAnnotator,
  TreeAnnotator,
  annotator,
};
pub use attributes::derive_attributes;
pub use classify::{SkipReason, Verdict, classify};
pub use processor::{LightboxProcessor, PageContext, ProcessedPage};
pub use types::{
  AnchorAttributes,
  AnnotatedHtml,
  ImageDiagnostic,
  ImageElement,
  ImageOutcome,
};
