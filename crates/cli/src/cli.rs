//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log Shipper - batches log lines and delivers them to a log destination
#[derive(Parser, Debug)]
#[command(
    name = "log-shipper",
    author,
    version,
    about = "Batching log shipper",
    long_about = "Reads log lines from stdin or a file, batches them by size and time,\n\
                  and delivers each batch to the configured sink and destination."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOG_SHIPPER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOG_SHIPPER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ship log lines to the configured destination
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
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "LOG_SHIPPER_CONFIG"
    )]
    pub config: PathBuf,

    /// Read lines from this file instead of stdin
    #[arg(short, long, env = "LOG_SHIPPER_INPUT")]
    pub input: Option<PathBuf>,

    /// Override destination group name
    #[arg(long, env = "LOG_SHIPPER_GROUP")]
    pub group: Option<String>,

    /// Override destination stream name
    #[arg(long, env = "LOG_SHIPPER_STREAM")]
    pub stream: Option<String>,

    /// Override events per batch
    #[arg(long, env = "LOG_SHIPPER_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Override flush interval in milliseconds
    #[arg(long, env = "LOG_SHIPPER_INTERVAL_MS")]
    pub interval_ms: Option<u64>,

    /// Sort each batch by timestamp before delivery
    #[arg(long)]
    pub ordered: bool,

    /// Validate configuration and exit without shipping
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOG_SHIPPER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
