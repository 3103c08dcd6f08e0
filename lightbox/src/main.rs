use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use lightbox::{
  cli::{Cli, Commands},
  utils,
};
use lightbox_config::Config;
use lightbox_core::LightboxProcessor;
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Some(Commands::Init {
    output,
    format,
    force,
  }) = &cli.command
  {
    // Check if file already exists and that we're not forcing overwrite
    if output.exists() && !force {
      bail!(
        "Configuration file already exists: {}. Use --force to overwrite.",
        output.display()
      );
    }

    if let Some(parent) = output.parent() {
      if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }
    }

    Config::generate_default_config(format, output).wrap_err_with(|| {
      format!(
        "Failed to generate configuration file: {}",
        output.display()
      )
    })?;

    info!(
      "Configuration file created successfully. Edit it to match your site."
    );
    return Ok(());
  }

  let config = cli
    .load_config()
    .wrap_err("Failed to load configuration")?;
  config.validate_paths()?;

  build_site(&config, cli.dry_run())
}

/// Apply the lightbox to every page of the built site.
fn build_site(config: &Config, dry_run: bool) -> Result<()> {
  info!(
    "Adding lightbox to {} ({} strategy){}",
    config.site_dir.display(),
    config.strategy,
    if dry_run { ", dry run" } else { "" }
  );

  // Setup thread pool once for all parallel operations
  let thread_count = config.jobs.unwrap_or_else(num_cpus::get);
  rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build_global()?;

  let processor = LightboxProcessor::from_config(config);
  let summary = utils::process_site(config, &processor, dry_run)?;

  utils::copy_assets(config, dry_run)?;

  info!("Processed {summary}");
  Ok(())
}
