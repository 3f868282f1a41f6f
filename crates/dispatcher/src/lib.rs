//! # Dispatcher
//!
//! Batching log-event delivery.
//!
//! - `Dispatcher` accepts events from any number of producers
//! - `BatchExporter` buffers them and flushes on size, interval or shutdown
//! - Sinks deliver each batch to a `LogDestination`
//!
//! ```ignore
//! let dispatcher = dispatcher::create_dispatcher(blueprint).await?;
//! dispatcher.dispatch(LogEvent::now("service started")).await;
//! dispatcher.stop().await;
//! ```

pub mod dispatcher;
pub mod error;
pub mod exporter;
pub mod handle;
pub mod metrics;
pub mod sinks;

#[cfg(test)]
mod test_support;

pub use contracts::{LogEvent, LogSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use exporter::{BatchExporter, FlushTrigger};
pub use handle::{DispatchHandle, DispatchWriter};
pub use metrics::{ExporterMetrics, MetricsSnapshot};
pub use sinks::{
    BatchEnvelope, FileSink, FileSinkConfig, NetworkFormat, NetworkSink, NetworkSinkConfig,
    TracingSink,
};
