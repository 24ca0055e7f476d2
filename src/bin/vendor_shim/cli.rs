//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Relocate third-party packages into the bundle output and register them as modules.
#[derive(Parser)]
#[command(name = "vendor-shim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Project root containing the vendor configuration
  #[arg(long, global = true, default_value = ".")]
  pub project: PathBuf,

  /// Configuration file to use instead of discovering one in the project root
  #[arg(long, global = true)]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
  /// Relocate packages, write adapters and the bundle manifest
  Build(BuildArgs),

  /// Validate declarations and resolve packages without writing anything
  Check(SelectArgs),

  /// Print the bundle manifest from the last build
  Show(ShowArgs),
}

#[derive(Args, Default)]
pub struct SelectArgs {
  /// Only process these logical module names
  #[arg(long = "only", value_name = "NAME")]
  pub only: Vec<String>,

  /// Skip these logical module names
  #[arg(long = "skip", value_name = "NAME")]
  pub skip: Vec<String>,
}

#[derive(Args)]
pub struct BuildArgs {
  #[command(flatten)]
  pub select: SelectArgs,

  /// Print the bundle manifest JSON after building
  #[arg(long)]
  pub print_manifest: bool,
}

#[derive(Args)]
pub struct ShowArgs {
  /// Print the raw manifest JSON
  #[arg(long)]
  pub json: bool,
}
