//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tagcopy - fan one event stream out to several destinations, re-tagging per destination
#[derive(Parser, Debug)]
#[command(
    name = "tagcopy",
    author,
    version,
    about = "Tag-rewriting fan-out stage for event pipelines",
    long_about = "Reads JSON-line events, groups them into batches and forwards every batch \n\
                  to the configured stores in order, rewriting the tag per store and \n\
                  optionally giving each store its own copy of the records."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TAGCOPY_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TAGCOPY_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch events through the configured stores
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "fanout.toml", env = "TAGCOPY_CONFIG")]
    pub config: PathBuf,

    /// Source tag of the incoming events
    #[arg(short, long, env = "TAGCOPY_TAG")]
    pub tag: String,

    /// JSON-lines input file (stdin when omitted)
    #[arg(short, long, env = "TAGCOPY_INPUT")]
    pub input: Option<PathBuf>,

    /// Events per batch
    #[arg(long, default_value = "100", env = "TAGCOPY_BATCH_SIZE")]
    pub batch_size: usize,

    /// Force deep-copy mode regardless of configuration
    #[arg(long)]
    pub deep_copy: bool,

    /// Keep going when a batch fails instead of aborting
    #[arg(long)]
    pub continue_on_error: bool,

    /// Validate configuration and build destinations, then exit
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "TAGCOPY_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "fanout.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "fanout.toml")]
    pub config: PathBuf,

    /// Show the tag every store would receive for this source tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_args() {
        let cli = Cli::try_parse_from([
            "tagcopy",
            "run",
            "--config",
            "fanout.json",
            "--tag",
            "app.access",
            "--batch-size",
            "10",
            "--deep-copy",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.tag, "app.access");
                assert_eq!(args.batch_size, 10);
                assert!(args.deep_copy);
                assert!(args.input.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
