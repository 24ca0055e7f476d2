//! vendor-shim CLI - relocate packages and register them with the module loader

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
  if let Err(e) = run() {
    eprintln!("error: {:#}", e);
    std::process::exit(1);
  }
}

fn run() -> Result<()> {
  let cli = Cli::parse();

  let default_filter = if cli.verbose {
    "vendor_shim_bundler=debug,vendor_shim=debug"
  } else {
    "vendor_shim_bundler=info,vendor_shim=info"
  };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .without_time()
    .with_writer(std::io::stderr)
    .init();

  let session = commands::Session::load(&cli.project, cli.config.as_deref())?;

  match cli.command {
    Commands::Build(args) => commands::build(&session, args),
    Commands::Check(args) => commands::check(&session, args),
    Commands::Show(args) => commands::show(&session, args),
  }
}
