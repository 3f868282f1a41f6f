//! # Log Shipper CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - Shipping stdin or a file through a batching dispatcher
//! - Graceful shutdown on Ctrl+C / SIGTERM

mod cli;
mod commands;
mod error;
mod shipper;

use anyhow::Result;
use clap::Parser;
use observability::{LogTarget, ObservabilityConfig};
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_shipper, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Log shipper starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_shipper(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(logging_config(cli))
}

/// Map `-v`/`-q`/`--log-format` onto the subscriber settings
///
/// Logs go to stderr so that `info --json` and friends keep stdout clean.
/// `-q` overrides RUST_LOG. The metrics endpoint is started by `run` itself.
fn logging_config(cli: &Cli) -> ObservabilityConfig {
    let default_log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    ObservabilityConfig {
        log_format: match cli.log_format {
            cli::LogFormat::Json => observability::LogFormat::Json,
            cli::LogFormat::Pretty => observability::LogFormat::Pretty,
            cli::LogFormat::Compact => observability::LogFormat::Compact,
        },
        target: LogTarget::Stderr,
        metrics_port: None,
        default_log_level: default_log_level.to_string(),
        ignore_env_filter: cli.quiet,
    }
}
