//! Dispatcher - producer front door for one batching exporter

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use contracts::{ExportConfig, LogEvent, LogSink, ShipperBlueprint, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::exporter::BatchExporter;
use crate::handle::{DispatchHandle, DispatchWriter};
use crate::metrics::{ExporterMetrics, MetricsSnapshot};
use crate::sinks::{FileSink, NetworkSink, TracingSink};

/// Builder for creating a Dispatcher from a loaded blueprint
pub struct DispatcherBuilder {
    blueprint: ShipperBlueprint,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(blueprint: ShipperBlueprint) -> Self {
        Self { blueprint }
    }

    /// Validate the export settings, create the sink and start the exporter
    ///
    /// # Errors
    /// [`DispatcherError::Contract`] for invalid export settings,
    /// [`DispatcherError::SinkCreation`] when the sink cannot be built.
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink = %self.blueprint.sink.name)
    )]
    pub async fn build(self) -> Result<Dispatcher, DispatcherError> {
        let config = self.blueprint.to_export_config()?;
        spawn_with_sink(&self.blueprint.sink, config).await
    }
}

/// Create the configured sink and spawn a dispatcher around it
#[instrument(
    name = "dispatcher_spawn_with_sink",
    skip(sink_config, export),
    fields(sink = %sink_config.name, sink_type = ?sink_config.sink_type)
)]
async fn spawn_with_sink(
    sink_config: &SinkConfig,
    export: ExportConfig,
) -> Result<Dispatcher, DispatcherError> {
    match sink_config.sink_type {
        SinkType::Log => {
            let sink = TracingSink::new(&sink_config.name);
            Ok(Dispatcher::spawn(sink, export))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&sink_config.name, &sink_config.params)
                .map_err(|e| DispatcherError::sink_creation(&sink_config.name, e.to_string()))?;
            Ok(Dispatcher::spawn(sink, export))
        }
        SinkType::Network => {
            let sink = NetworkSink::from_params(&sink_config.name, &sink_config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&sink_config.name, e.to_string()))?;
            Ok(Dispatcher::spawn(sink, export))
        }
    }
}

/// Accepts log events from any number of producers and hands them to a
/// single exporter task
///
/// Stop it with [`Dispatcher::stop`] to guarantee that everything accepted so
/// far has gone through a final flush. Dropping it instead closes the
/// hand-off queue (once every [`DispatchHandle`] clone is gone) and the
/// exporter flushes on its own, unobserved.
pub struct Dispatcher {
    handle: DispatchHandle,
    cancel: CancellationToken,
    metrics: Arc<ExporterMetrics>,
    worker_handle: JoinHandle<()>,
}

impl Dispatcher {
    /// Start an exporter for `sink` and return its dispatcher
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub fn spawn<S: LogSink + 'static>(sink: S, config: ExportConfig) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(config.queue_capacity());
        let cancel = CancellationToken::new();

        info!(
            sink = %name,
            destination = %config.destination(),
            queue_capacity = config.queue_capacity(),
            "Dispatcher starting"
        );

        let exporter = BatchExporter::new(sink, config);
        let metrics = Arc::clone(exporter.metrics());

        let worker_cancel = cancel.clone();
        let worker_handle = tokio::spawn(async move {
            exporter.run(rx, worker_cancel).await;
        });

        Self {
            handle: DispatchHandle::new(name, tx, Arc::clone(&metrics)),
            cancel,
            metrics,
            worker_handle,
        }
    }

    /// Sink name
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Current exporter counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Cloneable sender for additional producer tasks
    pub fn handle(&self) -> DispatchHandle {
        self.handle.clone()
    }

    /// Enqueue one event, waiting while the hand-off queue is full
    pub async fn dispatch(&self, event: LogEvent) {
        self.handle.dispatch(event).await;
    }

    /// Wrap `payload` as an event stamped now and enqueue it
    ///
    /// Returns `payload.len()`; delivery happens later and its outcome is
    /// never reported back.
    pub async fn write(&self, payload: &[u8]) -> usize {
        self.handle.write(payload).await
    }

    /// `std::io::Write` adapter for plain threads
    pub fn writer(&self) -> DispatchWriter {
        self.handle.writer()
    }

    /// Cancel the exporter and wait for its final flush
    ///
    /// Events accepted by the queue before this call are drained and
    /// flushed. Returns the final counters once the exporter task has
    /// finished, whether or not the final delivery succeeded.
    #[instrument(name = "dispatcher_stop", skip(self), fields(sink = %self.handle.name()))]
    pub async fn stop(self) -> MetricsSnapshot {
        let Self {
            handle,
            cancel,
            metrics,
            worker_handle,
        } = self;

        cancel.cancel();
        let name = handle.name().to_string();
        drop(handle);

        if let Err(e) = worker_handle.await {
            error!(sink = %name, error = ?e, "Exporter task panicked");
        }
        debug!(sink = %name, "Dispatcher stopped");
        metrics.snapshot()
    }
}

/// Convenience function to create a dispatcher from a blueprint
#[instrument(name = "dispatcher_create", skip(blueprint))]
pub async fn create_dispatcher(blueprint: ShipperBlueprint) -> Result<Dispatcher, DispatcherError> {
    DispatcherBuilder::new(blueprint).build().await
}
