use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lightbox_config::{Config, ConfigError, Strategy};

/// Command line interface for lightbox
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "Lightbox: click-to-zoom images for static documentation sites"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`]). Defaults to `build`.
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times), e.g. `lightbox.autoCaption=true`
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the lightbox CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new lightbox configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "lightbox.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(
      short = 'F',
      long,
      default_value = "toml",
      value_parser = ["toml", "json"]
    )]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Add the lightbox to every page of a built site.
  Build {
    /// Directory holding the built site.
    #[arg(short, long)]
    site_dir: Option<PathBuf>,

    /// Directory holding `lightbox.min.css` and `lightbox.min.js`.
    #[arg(short, long)]
    assets_dir: Option<PathBuf>,

    /// How images are rewritten: `tree` or `pattern`.
    #[arg(short = 'S', long)]
    strategy: Option<Strategy>,

    /// Number of threads to use for parallel processing.
    #[arg(short = 'p', long = "jobs")]
    jobs: Option<usize>,

    /// Process every page but write nothing.
    #[arg(short = 'n', long)]
    dry_run: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Whether the build should leave the site untouched.
  #[must_use]
  pub const fn dry_run(&self) -> bool {
    matches!(self.command, Some(Commands::Build { dry_run: true, .. }))
  }

  /// Load the configuration and apply the `build` flags on top of it.
  ///
  /// Flags given on the command line take precedence over config files and
  /// `--config` overrides.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load_config(&self) -> Result<Config, ConfigError> {
    let mut config = Config::load(&self.config_files, &self.config_overrides)?;

    if let Some(Commands::Build {
      site_dir,
      assets_dir,
      strategy,
      jobs,
      ..
    }) = &self.command
    {
      if let Some(site_dir) = site_dir {
        config.site_dir.clone_from(site_dir);
      }
      if assets_dir.is_some() {
        config.assets_dir.clone_from(assets_dir);
      }
      if let Some(strategy) = strategy {
        config.strategy = *strategy;
      }
      if jobs.is_some() {
        config.jobs = *jobs;
      }
    }

    Ok(config)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use std::fs;

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn cli_definition_is_valid() {
    Cli::command().debug_assert();
  }

  #[test]
  fn build_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("lightbox.toml");
    fs::write(
      &config_path,
      "site_dir = \"public\"\nstrategy = \"tree\"\njobs = \
       8\n\n[lightbox]\nmanual = true\n",
    )
    .unwrap();

    let cli = Cli::try_parse_from([
      "lightbox",
      "--config-file",
      config_path.to_str().unwrap(),
      "--config",
      "lightbox.autoCaption=true",
      "build",
      "--strategy",
      "pattern",
      "--jobs",
      "2",
      "--dry-run",
    ])
    .unwrap();
    assert!(cli.dry_run());

    let config = cli.load_config().unwrap();
    assert_eq!(config.site_dir, PathBuf::from("public"));
    assert_eq!(config.strategy, Strategy::Pattern);
    assert_eq!(config.jobs, Some(2));
    assert!(config.lightbox.manual);
    assert!(config.lightbox.auto_caption);
  }

  #[test]
  fn unknown_strategy_is_rejected() {
    let result =
      Cli::try_parse_from(["lightbox", "build", "--strategy", "regex"]);
    assert!(result.is_err());
  }

  #[test]
  fn init_is_not_a_dry_run() {
    let cli = Cli::try_parse_from(["lightbox", "init", "--format", "json"])
      .unwrap();
    assert!(!cli.dry_run());
    assert!(matches!(
      cli.command,
      Some(Commands::Init { ref format, force: false, .. }) if format == "json"
    ));
  }
}
