//! Producer-side handles onto a running exporter

use std::io;
use std::sync::Arc;

use contracts::LogEvent;
use tokio::sync::mpsc;
use tracing::error;

use crate::metrics::ExporterMetrics;

/// Cloneable sender half of a dispatcher
///
/// Any number of tasks may hold a clone. Sends wait while the hand-off queue
/// is full; a send after the exporter has stopped is logged and counted as
/// lost.
#[derive(Clone)]
pub struct DispatchHandle {
    name: String,
    tx: mpsc::Sender<LogEvent>,
    metrics: Arc<ExporterMetrics>,
}

impl DispatchHandle {
    pub(crate) fn new(
        name: String,
        tx: mpsc::Sender<LogEvent>,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self { name, tx, metrics }
    }

    /// Sink name this handle feeds
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue one event
    pub async fn dispatch(&self, event: LogEvent) {
        match self.tx.send(event).await {
            Ok(()) => observability::record_event_dispatched(&self.name),
            Err(mpsc::error::SendError(event)) => self.report_closed(&event),
        }
    }

    /// Wrap a raw payload as an event and enqueue it
    ///
    /// Always reports the whole payload as written.
    pub async fn write(&self, payload: &[u8]) -> usize {
        self.dispatch(LogEvent::from_bytes(payload)).await;
        payload.len()
    }

    /// Blocking variant of [`dispatch`](Self::dispatch) for plain threads
    ///
    /// # Panics
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_dispatch(&self, event: LogEvent) {
        match self.tx.blocking_send(event) {
            Ok(()) => observability::record_event_dispatched(&self.name),
            Err(mpsc::error::SendError(event)) => self.report_closed(&event),
        }
    }

    /// `std::io::Write` adapter over this handle
    pub fn writer(&self) -> DispatchWriter {
        DispatchWriter {
            handle: self.clone(),
        }
    }

    fn report_closed(&self, event: &LogEvent) {
        self.metrics.add_lost(1);
        error!(
            sink = %self.name,
            timestamp = %event.timestamp,
            bytes = event.message.len(),
            "Exporter stopped, log event dropped"
        );
    }
}

/// Synchronous writer turning each `write` call into one log event
///
/// Meant for plain threads (stdin readers, `log`-style bridges). Each call
/// blocks while the hand-off queue is full.
///
/// # Panics
/// `write` panics when called from within an asynchronous execution context;
/// use [`DispatchHandle::write`] there instead.
#[derive(Clone)]
pub struct DispatchWriter {
    handle: DispatchHandle,
}

impl io::Write for DispatchWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle.blocking_dispatch(LogEvent::from_bytes(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Delivery is asynchronous; nothing is buffered on this side.
        Ok(())
    }
}
