use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use lightbox::cli::Cli;

const BIN_NAME: &str = "lightbox";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build distribution artifacts for the lightbox CLI
  Dist {
    /// Output directory for generated files.
    #[arg(
      short,
      long,
      default_value = "dist",
      value_parser = clap::value_parser!(PathBuf)
    )]
    output_dir: PathBuf,

    /// Shells to generate completions for. Defaults to all supported shells.
    #[arg(short, long, value_enum, action = clap::ArgAction::Append)]
    shell: Vec<Shell>,

    /// Only generate shell completions.
    #[arg(long, conflicts_with = "manpage_only")]
    completions_only: bool,

    /// Only generate manpage.
    #[arg(long, conflicts_with = "completions_only")]
    manpage_only: bool,
  },
}

fn main() -> Result<()> {
  let xtask = Xtask::parse();

  match xtask.command {
    Commands::Dist {
      output_dir,
      shell,
      completions_only,
      manpage_only,
    } => {
      let shells = if shell.is_empty() {
        vec![Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell]
      } else {
        shell
      };

      if !manpage_only {
        generate_completions(&output_dir, &shells)?;
      }
      if !completions_only {
        generate_manpage(&output_dir)?;
      }
    },
  }

  Ok(())
}

/// Generate completion scripts for `shells` under `<output_dir>/completions`.
fn generate_completions(output_dir: &Path, shells: &[Shell]) -> Result<()> {
  let completions_dir = output_dir.join("completions");
  fs::create_dir_all(&completions_dir).with_context(|| {
    format!("Failed to create {}", completions_dir.display())
  })?;

  let mut cmd = Cli::command();
  for &shell in shells {
    let path = generate_to(shell, &mut cmd, BIN_NAME, &completions_dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
    println!("Generated {}", path.display());
  }
  Ok(())
}

/// Generate the `lightbox(1)` manpage under `<output_dir>/man`.
fn generate_manpage(output_dir: &Path) -> Result<()> {
  let man_dir = output_dir.join("man");
  fs::create_dir_all(&man_dir)
    .with_context(|| format!("Failed to create {}", man_dir.display()))?;

  let file_path = man_dir.join(format!("{BIN_NAME}.1"));
  let mut file = fs::File::create(&file_path).with_context(|| {
    format!("Failed to create manpage file at {}", file_path.display())
  })?;
  Man::new(Cli::command())
    .render(&mut file)
    .with_context(|| "Failed to render manpage")?;
  println!("Manpage generated in {}", man_dir.display());
  Ok(())
}
