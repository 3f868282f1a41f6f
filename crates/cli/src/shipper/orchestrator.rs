//! Shipper orchestrator - input reader, dispatcher and shutdown handling.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, info, instrument, warn};

use contracts::ShipperBlueprint;

use super::stats::ShipperStats;
use crate::error::CliError;

/// Configuration for a shipper run
#[derive(Debug, Clone)]
pub struct ShipperConfig {
    /// Validated configuration
    pub blueprint: ShipperBlueprint,
    /// Input file; stdin when absent
    pub input: Option<PathBuf>,
    /// Prometheus port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Reads lines from the input and ships them until end of input or a
/// shutdown signal
pub struct Shipper {
    config: ShipperConfig,
}

enum ReaderOutcome {
    Finished(std::result::Result<io::Result<()>, oneshot::error::RecvError>),
    Interrupted,
}

impl Shipper {
    pub fn new(config: ShipperConfig) -> Self {
        Self { config }
    }

    /// Run to completion, always stopping the dispatcher before returning
    #[instrument(
        name = "shipper_run",
        skip(self),
        fields(destination = %self.config.blueprint.log_destination())
    )]
    pub async fn run(self) -> Result<ShipperStats> {
        let start = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)
                .context("Failed to start metrics endpoint")?;
        }

        let input = open_input(self.config.input.as_deref())?;
        let dispatcher = dispatcher::create_dispatcher(self.config.blueprint)
            .await
            .context("Failed to create dispatcher")?;

        let lines = Arc::new(AtomicU64::new(0));
        let reader = spawn_reader(input, dispatcher.writer(), Arc::clone(&lines))?;
        info!(sink = %dispatcher.name(), "Shipping input lines");

        let outcome = tokio::select! {
            result = reader => ReaderOutcome::Finished(result),
            () = shutdown_signal() => ReaderOutcome::Interrupted,
        };

        let interrupted = matches!(outcome, ReaderOutcome::Interrupted);
        if interrupted {
            warn!("Received shutdown signal, stopping dispatcher...");
        }

        let metrics = dispatcher.stop().await;

        match outcome {
            ReaderOutcome::Finished(Ok(Ok(()))) => debug!("Input exhausted"),
            ReaderOutcome::Finished(Ok(Err(e))) => {
                return Err(CliError::input_reader(e.to_string()).into());
            }
            ReaderOutcome::Finished(Err(_)) => {
                return Err(CliError::input_reader("reader thread exited without reporting").into());
            }
            ReaderOutcome::Interrupted => {}
        }

        Ok(ShipperStats {
            lines_read: lines.load(Ordering::Relaxed),
            duration: start.elapsed(),
            interrupted,
            metrics,
        })
    }
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>, CliError> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .map_err(|e| CliError::input_open(path.display().to_string(), e.to_string()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Read on a plain thread so a blocked stdin read never holds up shutdown
fn spawn_reader<W: Write + Send + 'static>(
    input: Box<dyn BufRead + Send>,
    writer: W,
    lines: Arc<AtomicU64>,
) -> Result<oneshot::Receiver<io::Result<()>>> {
    let (done_tx, done_rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("log-shipper-input".to_string())
        .spawn(move || {
            let result = pump_lines(input, writer, &lines);
            let _ = done_tx.send(result);
        })
        .context("Failed to spawn input reader thread")?;
    Ok(done_rx)
}

/// Forward every non-empty line as one write; `\r\n` endings are trimmed
fn pump_lines<R: BufRead, W: Write>(reader: R, mut writer: W, lines: &AtomicU64) -> io::Result<()> {
    for chunk in reader.split(b'\n') {
        let mut line = chunk?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        // Empty messages cannot be delivered and would poison their batch.
        if line.is_empty() {
            continue;
        }
        writer.write_all(&line)?;
        lines.fetch_add(1, Ordering::Relaxed);
    }
    writer.flush()
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
