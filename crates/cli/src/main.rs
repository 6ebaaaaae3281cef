//! # tagcopy CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - configuration loading and validation
//! - JSON-lines dispatch through the configured stores
//! - per-store tag previews

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "tagcopy starting");

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
///
/// `RUST_LOG` takes precedence over `-v`, except with `--quiet`.
fn init_logging(cli: &Cli) -> Result<()> {
    if cli.quiet {
        std::env::remove_var("RUST_LOG");
    }
    let default_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };

    observability::init_tracing(cli.log_format.into(), default_level)
}
