use std::{fs, path::Path};

use color_eyre::eyre::{self, Context, Result};
use lightbox_config::Config;
use lightbox_core::url::{SCRIPT_PATH, STYLESHEET_PATH};
use log::{debug, info, warn};

/// Viewer assets as `(file in assets_dir, destination in the site)`.
const VIEWER_ASSETS: [(&str, &str); 2] = [
  ("lightbox.min.css", STYLESHEET_PATH),
  ("lightbox.min.js", SCRIPT_PATH),
];

/// Copies the viewer stylesheet and script from the configured assets
/// directory into the site, once per build.
///
/// Without an assets directory nothing is copied and a warning is logged;
/// the pages will reference assets that must be provided some other way.
///
/// # Returns
///
/// Whether the assets were copied.
///
/// # Errors
///
/// Returns an error if an asset is missing from the assets directory or
/// cannot be copied.
pub fn copy_assets(config: &Config, dry_run: bool) -> Result<bool> {
  let Some(assets_dir) = &config.assets_dir else {
    warn!(
      "No assets directory configured; {STYLESHEET_PATH} and {SCRIPT_PATH} \
       must be provided separately"
    );
    return Ok(false);
  };

  for (name, destination) in VIEWER_ASSETS {
    let source = assets_dir.join(name);
    if !source.is_file() {
      eyre::bail!("Viewer asset not found: {}", source.display());
    }

    let target = config.site_dir.join(destination);
    if dry_run {
      info!("Would copy {} to {}", source.display(), target.display());
      continue;
    }
    copy_asset(&source, &target)?;
  }

  if !dry_run {
    info!("Copied viewer assets from {}", assets_dir.display());
  }
  Ok(!dry_run)
}

fn copy_asset(source: &Path, target: &Path) -> Result<()> {
  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }

  let options = fs_extra::file::CopyOptions::new().overwrite(true);
  fs_extra::file::copy(source, target, &options).wrap_err_with(|| {
    format!(
      "Failed to copy {} to {}",
      source.display(),
      target.display()
    )
  })?;
  debug!("Copied {} to {}", source.display(), target.display());

  Ok(())
}
