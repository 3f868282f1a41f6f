//! Exporter metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters for a single exporter, shared with its dispatcher
#[derive(Debug, Default)]
pub struct ExporterMetrics {
    /// Current buffer length
    buffer_len: AtomicUsize,
    /// Events taken off the hand-off queue
    received_count: AtomicU64,
    /// Batches handed to flush (non-empty only)
    batch_count: AtomicU64,
    /// Events the sink accepted
    delivered_count: AtomicU64,
    /// Events discarded by a failed flush or a closed queue
    lost_count: AtomicU64,
    /// Batches aborted because an event could not be converted
    conversion_failures: AtomicU64,
    /// Batches the sink failed or timed out on
    sink_failures: AtomicU64,
    /// Subset of sink failures reporting a missing destination
    destination_not_found: AtomicU64,
}

impl ExporterMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len.load(Ordering::Relaxed)
    }

    pub fn set_buffer_len(&self, len: usize) {
        self.buffer_len.store(len, Ordering::Relaxed);
    }

    pub fn received_count(&self) -> u64 {
        self.received_count.load(Ordering::Relaxed)
    }

    pub fn inc_received_count(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    pub fn inc_batch_count(&self) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    pub fn add_delivered(&self, events: usize) {
        self.delivered_count
            .fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn lost_count(&self) -> u64 {
        self.lost_count.load(Ordering::Relaxed)
    }

    pub fn add_lost(&self, events: usize) {
        self.lost_count.fetch_add(events as u64, Ordering::Relaxed);
    }

    pub fn conversion_failures(&self) -> u64 {
        self.conversion_failures.load(Ordering::Relaxed)
    }

    pub fn inc_conversion_failures(&self) {
        self.conversion_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    pub fn inc_sink_failures(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn destination_not_found(&self) -> u64 {
        self.destination_not_found.load(Ordering::Relaxed)
    }

    pub fn inc_destination_not_found(&self) {
        self.destination_not_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            buffer_len: self.buffer_len(),
            received_count: self.received_count(),
            batch_count: self.batch_count(),
            delivered_count: self.delivered_count(),
            lost_count: self.lost_count(),
            conversion_failures: self.conversion_failures(),
            sink_failures: self.sink_failures(),
            destination_not_found: self.destination_not_found(),
        }
    }
}

/// Snapshot of exporter metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub buffer_len: usize,
    pub received_count: u64,
    pub batch_count: u64,
    pub delivered_count: u64,
    pub lost_count: u64,
    pub conversion_failures: u64,
    pub sink_failures: u64,
    pub destination_not_found: u64,
}
