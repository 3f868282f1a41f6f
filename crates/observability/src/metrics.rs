//! Shipper metrics
//!
//! Thin wrappers over the `metrics` facade so every crate records under the
//! same names and labels.

use metrics::{counter, gauge, histogram};

/// Record one event accepted by a dispatcher
pub fn record_event_dispatched(sink_name: &str) {
    counter!(
        "log_shipper_events_dispatched_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Record a batch handed to a sink
///
/// `trigger` is one of `size`, `interval`, `shutdown`.
pub fn record_batch_flushed(sink_name: &str, trigger: &'static str, batch_size: usize) {
    counter!(
        "log_shipper_batches_flushed_total",
        "sink" => sink_name.to_string(),
        "trigger" => trigger
    )
    .increment(1);
    histogram!("log_shipper_batch_size", "sink" => sink_name.to_string())
        .record(batch_size as f64);
}

/// Record a batch delivered successfully
pub fn record_batch_delivered(sink_name: &str, events: usize, latency_ms: f64) {
    counter!(
        "log_shipper_events_delivered_total",
        "sink" => sink_name.to_string()
    )
    .increment(events as u64);
    histogram!("log_shipper_put_logs_latency_ms", "sink" => sink_name.to_string())
        .record(latency_ms);
}

/// Record a failed flush and the events it discarded
///
/// `kind` comes from `ContractError::kind`.
pub fn record_flush_failure(sink_name: &str, kind: &'static str, events_lost: usize) {
    counter!(
        "log_shipper_flush_failures_total",
        "sink" => sink_name.to_string(),
        "kind" => kind
    )
    .increment(1);
    counter!(
        "log_shipper_events_lost_total",
        "sink" => sink_name.to_string(),
        "kind" => kind
    )
    .increment(events_lost as u64);
}

/// Record events the backend refused individually
pub fn record_events_rejected(sink_name: &str) {
    counter!(
        "log_shipper_rejected_responses_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Record exporter buffer length
pub fn record_buffer_depth(sink_name: &str, depth: usize) {
    gauge!(
        "log_shipper_buffer_depth",
        "sink" => sink_name.to_string()
    )
    .set(depth as f64);
}
