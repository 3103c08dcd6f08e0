use std::{
  fmt,
  fs,
  path::{Component, Path, PathBuf},
};

use color_eyre::eyre::{Context, Result};
use lightbox_config::Config;
use lightbox_core::{
  ImageOutcome,
  LightboxProcessor,
  PageContext,
  ProcessedPage,
};
use log::{debug, info};
use rayon::prelude::*;

/// Totals over every page of one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
  pub pages:     usize,
  /// Pages whose output differs from what was read.
  pub changed:   usize,
  pub disabled:  usize,
  pub injected:  usize,
  pub wrapped:   usize,
  pub skipped:   usize,
  /// Eligible images left as found after a recoverable problem.
  pub recovered: usize,
}

impl BuildSummary {
  fn from_page(page: &ProcessedPage, changed: bool) -> Self {
    let mut summary = Self {
      pages: 1,
      changed: usize::from(changed),
      disabled: usize::from(page.disabled),
      injected: usize::from(page.injected),
      ..Self::default()
    };

    for outcome in &page.outcomes {
      match outcome {
        ImageOutcome::Wrapped { .. } => summary.wrapped += 1,
        ImageOutcome::Skipped(_) => summary.skipped += 1,
        ImageOutcome::Unchanged(_) => summary.recovered += 1,
      }
    }

    summary
  }

  #[must_use]
  pub const fn combine(self, other: Self) -> Self {
    Self {
      pages:     self.pages + other.pages,
      changed:   self.changed + other.changed,
      disabled:  self.disabled + other.disabled,
      injected:  self.injected + other.injected,
      wrapped:   self.wrapped + other.wrapped,
      skipped:   self.skipped + other.skipped,
      recovered: self.recovered + other.recovered,
    }
  }
}

impl fmt::Display for BuildSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} pages ({} changed, {} disabled), {} images wrapped, {} skipped, {} \
       left unchanged",
      self.pages,
      self.changed,
      self.disabled,
      self.wrapped,
      self.skipped,
      self.recovered
    )
  }
}

/// Collect every `.html` file below `site_dir`, sorted by path.
#[must_use]
pub fn collect_html_files(site_dir: &Path) -> Vec<PathBuf> {
  let mut files: Vec<PathBuf> = walkdir::WalkDir::new(site_dir)
    .follow_links(true)
    .into_iter()
    .filter_map(std::result::Result::ok)
    .filter(|e| {
      e.file_type().is_file()
        && e
          .path()
          .extension()
          .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
    })
    .map(walkdir::DirEntry::into_path)
    .collect();

  files.sort();
  files
}

/// Site-relative URL of the page stored at `rel_path`.
///
/// `index.html` files are served as their directory (`guide/index.html` is
/// `guide/`, the site's own index is `""`); other files keep their path.
#[must_use]
pub fn page_url(rel_path: &Path) -> String {
  let segments: Vec<_> = rel_path
    .components()
    .filter_map(|component| {
      match component {
        Component::Normal(segment) => Some(segment.to_string_lossy()),
        _ => None,
      }
    })
    .collect();

  match segments.split_last() {
    Some((last, directories)) if last.eq_ignore_ascii_case("index.html") => {
      directories.iter().map(|dir| format!("{dir}/")).collect()
    },
    _ => segments.join("/"),
  }
}

/// Apply the lightbox to every page of the site in parallel.
///
/// Pages are rewritten in place unless `dry_run` is set. Pages whose output
/// equals their input are never written.
///
/// # Errors
///
/// Returns an error if a page cannot be read or written.
pub fn process_site(
  config: &Config,
  processor: &LightboxProcessor,
  dry_run: bool,
) -> Result<BuildSummary> {
  let files = collect_html_files(&config.site_dir);
  info!(
    "Found {} HTML files in {}",
    files.len(),
    config.site_dir.display()
  );

  files
    .par_iter()
    .map(|path| process_file(config, processor, path, dry_run))
    .try_reduce(BuildSummary::default, |a, b| Ok(a.combine(b)))
}

fn process_file(
  config: &Config,
  processor: &LightboxProcessor,
  path: &Path,
  dry_run: bool,
) -> Result<BuildSummary> {
  let rel_path = path.strip_prefix(&config.site_dir).wrap_err_with(|| {
    format!("Failed to determine relative path for {}", path.display())
  })?;
  let url = page_url(rel_path);

  // The processor expects the URL the page is served at
  let base_path = &processor.env().base_path;
  let served_url = if base_path.is_empty() {
    url.clone()
  } else {
    format!("/{base_path}/{url}")
  };

  let html = fs::read_to_string(path)
    .wrap_err_with(|| format!("Failed to read page: {}", path.display()))?;
  let page = PageContext {
    url:  &served_url,
    meta: config.page_meta(&url),
  };
  let processed = processor.process_document(&html, &page);

  let changed = processed.html != html;
  if changed && !dry_run {
    fs::write(path, &processed.html)
      .wrap_err_with(|| format!("Failed to write page: {}", path.display()))?;
    debug!("Rewrote {}", path.display());
  }

  Ok(BuildSummary::from_page(&processed, changed))
}
