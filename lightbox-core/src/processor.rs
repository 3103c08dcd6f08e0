//! Per-page pipeline: resolve the page, annotate its images, inject assets.
use lightbox_config::{
  BuildEnvironment,
  Config,
  LightboxConfig,
  PageMeta,
  PageState,
  Strategy,
};
use log::{debug, trace};

use crate::{
  annotate::{AnnotateContext, annotator},
  inject::inject_assets,
  types::{AnnotatedHtml, ImageOutcome},
  url::site_relative,
};

/// A page as handed over by the host build.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageContext<'a> {
  /// Page URL, site-relative (`""`, `guide/`, `guide/setup.html`). A leading
  /// `/` and the site's base path are stripped.
  pub url:  &'a str,
  /// The page's front-matter, if any.
  pub meta: Option<&'a PageMeta>,
}

/// Result of processing one full document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedPage {
  pub html:     String,
  /// The page opted out with `glightbox: false` and was returned as is.
  pub disabled: bool,
  /// Viewer assets were added to the page.
  pub injected: bool,
  pub outcomes: Vec<ImageOutcome>,
}

/// Applies the lightbox to pages of one build.
///
/// Holds the global options and the build environment, both read-only, so a
/// single processor can be shared by every worker thread.
#[derive(Debug, Clone)]
pub struct LightboxProcessor {
  config:   LightboxConfig,
  env:      BuildEnvironment,
  strategy: Strategy,
}

impl LightboxProcessor {
  #[must_use]
  pub const fn new(
    config: LightboxConfig,
    env: BuildEnvironment,
    strategy: Strategy,
  ) -> Self {
    Self {
      config,
      env,
      strategy,
    }
  }

  /// Build a processor from the loaded configuration.
  #[must_use]
  pub fn from_config(config: &Config) -> Self {
    Self::new(
      config.lightbox.clone(),
      BuildEnvironment::from_config(config),
      config.strategy,
    )
  }

  #[must_use]
  pub const fn config(&self) -> &LightboxConfig {
    &self.config
  }

  #[must_use]
  pub const fn env(&self) -> &BuildEnvironment {
    &self.env
  }

  #[must_use]
  pub const fn strategy(&self) -> Strategy {
    self.strategy
  }

  /// Resolve the page's metadata against the global options.
  #[must_use]
  pub fn resolve<'a>(&'a self, meta: Option<&PageMeta>) -> PageState<'a> {
    PageState::resolve(&self.config, meta)
  }

  /// Wrap the eligible images of a page's rendered content.
  ///
  /// Accepts a body fragment or a full document. Disabled pages come back
  /// unchanged with no outcomes.
  #[must_use]
  pub fn annotate_content(
    &self,
    html: &str,
    page: &PageContext<'_>,
  ) -> AnnotatedHtml {
    let url = site_relative(page.url, &self.env.base_path);
    match self.resolve(page.meta) {
      PageState::Disabled => {
        debug!("{url}: lightbox disabled by page metadata");
        AnnotatedHtml::unchanged(html)
      },
      PageState::Enabled(effective) => {
        let cx = AnnotateContext {
          url: &url,
          effective,
          env: &self.env,
        };
        annotator(self.strategy).annotate(html, &cx)
      },
    }
  }

  /// Add the viewer assets and initialization to a full document.
  ///
  /// Returns the document unchanged when the page is disabled, lacks a head
  /// or body, or already carries the viewer.
  #[must_use]
  pub fn inject(&self, html: &str, page: &PageContext<'_>) -> String {
    let url = site_relative(page.url, &self.env.base_path);
    match self.resolve(page.meta) {
      PageState::Disabled => html.to_string(),
      PageState::Enabled(effective) => {
        inject_assets(html, &url, &effective, &self.env)
          .unwrap_or_else(|| html.to_string())
      },
    }
  }

  /// Run the whole pipeline over a full document.
  #[must_use]
  pub fn process_document(
    &self,
    html: &str,
    page: &PageContext<'_>,
  ) -> ProcessedPage {
    let url = site_relative(page.url, &self.env.base_path);
    let PageState::Enabled(effective) = self.resolve(page.meta) else {
      debug!("{url}: lightbox disabled by page metadata");
      return ProcessedPage {
        html: html.to_string(),
        disabled: true,
        ..ProcessedPage::default()
      };
    };

    let cx = AnnotateContext {
      url: &url,
      effective,
      env: &self.env,
    };
    let annotated = annotator(self.strategy).annotate(html, &cx);
    trace!(
      "{url}: {} wrapped, {} skipped, {} left unchanged",
      annotated.wrapped_count(),
      annotated.skipped_count(),
      annotated.recovered_count()
    );

    let injected = inject_assets(&annotated.html, &url, &effective, &self.env);
    ProcessedPage {
      injected: injected.is_some(),
      html:     injected.unwrap_or(annotated.html),
      disabled: false,
      outcomes: annotated.outcomes,
    }
  }
}
