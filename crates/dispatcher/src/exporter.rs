//! BatchExporter - owns the event buffer and applies the flush policy
//!
//! One exporter runs as a single task. It reacts to three sources, one at a
//! time:
//!
//! ```text
//!   cancellation --> drain queue --> terminal flush --> close sink
//!   timer tick   --> flush (interval)
//!   event        --> append --> len >= batch_size ? flush (size)
//! ```
//!
//! The buffer is never shared: producers reach it only through the bounded
//! hand-off channel.

use std::sync::Arc;

use contracts::{
    to_input_log_events, ContractError, ExportConfig, LogEvent, LogSink, RejectedLogEvents,
};
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::metrics::ExporterMetrics;

/// What caused a flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Buffer reached the batch size
    Size,
    /// Periodic timer tick
    Interval,
    /// Cancellation or closed hand-off queue
    Shutdown,
}

impl FlushTrigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Interval => "interval",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Buffers events and flushes them to a sink in batches
pub struct BatchExporter<S> {
    name: String,
    sink: S,
    queue: Vec<LogEvent>,
    config: ExportConfig,
    metrics: Arc<ExporterMetrics>,
}

impl<S: LogSink> BatchExporter<S> {
    /// Create an exporter with fresh metrics
    pub fn new(sink: S, config: ExportConfig) -> Self {
        Self::with_metrics(sink, config, Arc::new(ExporterMetrics::new()))
    }

    /// Create an exporter reporting into existing metrics
    pub fn with_metrics(sink: S, config: ExportConfig, metrics: Arc<ExporterMetrics>) -> Self {
        Self {
            name: sink.name().to_string(),
            queue: Vec::with_capacity(config.batch_size()),
            sink,
            config,
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<ExporterMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Number of buffered events
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Run the exporter loop until cancelled or the hand-off queue closes
    ///
    /// Always ends with a terminal flush and closes the sink. Returning from
    /// this future is the completion signal.
    #[instrument(
        name = "exporter_loop",
        skip(self, rx, cancel),
        fields(sink = %self.name, destination = %self.config.destination())
    )]
    pub async fn run(mut self, mut rx: mpsc::Receiver<LogEvent>, cancel: CancellationToken) {
        let interval = self.config.interval();
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            sink = %self.name,
            batch_size = self.config.batch_size(),
            interval_ms = interval.as_millis() as u64,
            ordered = self.config.ordered_logs(),
            "Exporter started"
        );

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!(sink = %self.name, "Cancellation received, draining hand-off queue");
                    self.drain(&mut rx).await;
                    break;
                }
                _ = ticker.tick() => {
                    self.flush(FlushTrigger::Interval).await;
                }
                received = rx.recv() => match received {
                    Some(event) => self.accept(event).await,
                    None => {
                        debug!(sink = %self.name, "Hand-off queue closed");
                        self.flush(FlushTrigger::Shutdown).await;
                        break;
                    }
                },
            }
        }

        if let Err(e) = self.sink.close().await {
            error!(sink = %self.name, error = %e, "Close failed on shutdown");
        }

        let snapshot = self.metrics.snapshot();
        info!(
            sink = %self.name,
            received = snapshot.received_count,
            delivered = snapshot.delivered_count,
            lost = snapshot.lost_count,
            "Exporter stopped"
        );
    }

    /// Append one event, flushing when the batch size is reached
    pub async fn accept(&mut self, event: LogEvent) {
        self.queue.push(event);
        self.metrics.inc_received_count();
        self.metrics.set_buffer_len(self.queue.len());
        observability::record_buffer_depth(&self.name, self.queue.len());

        if self.queue.len() >= self.config.batch_size() {
            self.flush(FlushTrigger::Size).await;
        }
    }

    /// Take the whole buffer, leaving an empty one behind
    ///
    /// With ordered logs the batch is stable-sorted by timestamp.
    pub fn take_from_queue(&mut self) -> Vec<LogEvent> {
        let mut logs = std::mem::replace(
            &mut self.queue,
            Vec::with_capacity(self.config.batch_size()),
        );
        self.metrics.set_buffer_len(0);

        if self.config.ordered_logs() {
            logs.sort_by_key(|event| event.timestamp);
        }

        logs
    }

    /// Flush the current buffer; an empty buffer is a no-op
    pub async fn flush(&mut self, trigger: FlushTrigger) {
        if self.queue.is_empty() {
            return;
        }
        let batch = self.take_from_queue();
        self.deliver(batch, trigger).await;
    }

    /// Close the queue and consume everything it already accepted
    async fn drain(&mut self, rx: &mut mpsc::Receiver<LogEvent>) {
        rx.close();
        while let Some(event) = rx.recv().await {
            self.accept(event).await;
        }
        self.flush(FlushTrigger::Shutdown).await;
    }

    async fn deliver(&mut self, batch: Vec<LogEvent>, trigger: FlushTrigger) {
        let count = batch.len();
        self.metrics.inc_batch_count();
        observability::record_batch_flushed(&self.name, trigger.as_str(), count);

        let records = match to_input_log_events(&batch) {
            Ok(records) => records,
            Err(e) => {
                self.metrics.inc_conversion_failures();
                self.record_loss(&e, count, trigger);
                return;
            }
        };

        let timeout = self.config.put_timeout();
        let started = Instant::now();
        let result = match time::timeout(
            timeout,
            self.sink.put_logs(self.config.destination(), &records),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => Err(ContractError::Timeout {
                sink_name: self.name.clone(),
                timeout,
            }),
        };

        match result {
            Ok(response) => {
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                self.metrics.add_delivered(count);
                observability::record_batch_delivered(&self.name, count, latency_ms);
                debug!(
                    sink = %self.name,
                    trigger = trigger.as_str(),
                    batch_size = count,
                    latency_ms,
                    "Batch delivered"
                );
                if let Some(rejected) = response.rejected {
                    self.report_rejected(&rejected, count);
                }
            }
            Err(e) => {
                self.metrics.inc_sink_failures();
                if e.is_destination_not_found() {
                    self.metrics.inc_destination_not_found();
                }
                self.record_loss(&e, count, trigger);
            }
        }
    }

    fn record_loss(&self, error: &ContractError, count: usize, trigger: FlushTrigger) {
        self.metrics.add_lost(count);
        observability::record_flush_failure(&self.name, error.kind(), count);
        error!(
            sink = %self.name,
            destination = %self.config.destination(),
            trigger = trigger.as_str(),
            batch_size = count,
            kind = error.kind(),
            error = %error,
            "Unable to put logs, batch dropped"
        );
    }

    fn report_rejected(&self, rejected: &RejectedLogEvents, count: usize) {
        observability::record_events_rejected(&self.name);
        warn!(
            sink = %self.name,
            destination = %self.config.destination(),
            batch_size = count,
            too_new_start_index = ?rejected.too_new_start_index,
            too_old_end_index = ?rejected.too_old_end_index,
            expired_end_index = ?rejected.expired_end_index,
            "Put logs rejected some events"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::time::Duration;
    use tokio::time::sleep;

    fn config(batch_size: usize, interval: Duration) -> ExportConfig {
        ExportConfig::builder()
            .group_name("app")
            .stream_name("test")
            .batch_size(batch_size)
            .interval(interval)
            .build()
            .unwrap()
    }

    fn event_at(message: &str, millis: i64) -> LogEvent {
        LogEvent::new(message, Utc.timestamp_millis_opt(millis).unwrap())
    }

    #[tokio::test]
    async fn test_take_from_queue_sorts_when_ordered() {
        let (sink, _probe) = RecordingSink::new("ordered");
        let config = ExportConfig::builder()
            .batch_size(10)
            .ordered_logs(true)
            .build()
            .unwrap();
        let mut exporter = BatchExporter::new(sink, config);

        let base = Utc::now();
        for (message, offset) in [("c", 30), ("a", 10), ("tie-1", 20), ("b", 15), ("tie-2", 20)] {
            exporter
                .accept(LogEvent::new(message, base + ChronoDuration::milliseconds(offset)))
                .await;
        }

        let batch = exporter.take_from_queue();
        let messages: Vec<_> = batch.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "tie-1", "tie-2", "c"]);
        assert_eq!(exporter.queue_len(), 0);
    }

    #[tokio::test]
    async fn test_take_from_queue_keeps_arrival_order_by_default() {
        let (sink, _probe) = RecordingSink::new("unordered");
        let mut exporter = BatchExporter::new(sink, config(10, Duration::from_secs(60)));

        exporter.accept(event_at("late", 2_000)).await;
        exporter.accept(event_at("early", 1_000)).await;

        let batch = exporter.take_from_queue();
        assert_eq!(batch[0].message, "late");
        assert_eq!(batch[1].message, "early");
    }

    #[tokio::test]
    async fn test_size_trigger_yields_ceil_batches() {
        let (sink, probe) = RecordingSink::new("size");
        let exporter = BatchExporter::new(sink, config(3, Duration::from_secs(3600)));
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(exporter.run(rx, CancellationToken::new()));
        for i in 0..10 {
            tx.send(LogEvent::now(format!("event-{i}"))).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(probe.batch_sizes(), vec![3, 3, 3, 1]);
        assert!(probe.closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_then_size_flush() {
        let (sink, probe) = RecordingSink::new("timing");
        let exporter = BatchExporter::new(sink, config(3, Duration::from_millis(100)));
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(exporter.run(rx, cancel.clone()));

        tx.send(LogEvent::now("one")).await.unwrap();
        tx.send(LogEvent::now("two")).await.unwrap();
        sleep(Duration::from_millis(150)).await;
        assert_eq!(probe.batch_sizes(), vec![2]);

        for message in ["three", "four", "five"] {
            tx.send(LogEvent::now(message)).await.unwrap();
        }
        sleep(Duration::from_millis(10)).await;
        assert_eq!(probe.batch_sizes(), vec![2, 3]);

        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_ticks_do_not_call_sink() {
        let (sink, probe) = RecordingSink::new("idle");
        let exporter = BatchExporter::new(sink, config(3, Duration::from_millis(100)));
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(exporter.run(rx, cancel.clone()));

        sleep(Duration::from_millis(350)).await;
        assert_eq!(probe.calls(), 0);

        cancel.cancel();
        handle.await.unwrap();
        drop(tx);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_message_aborts_whole_batch() {
        let (sink, probe) = RecordingSink::new("convert");
        let exporter = BatchExporter::new(sink, config(2, Duration::from_secs(3600)));
        let metrics = Arc::clone(exporter.metrics());
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(exporter.run(rx, CancellationToken::new()));

        tx.send(event_at("", 1_000)).await.unwrap();
        tx.send(event_at("ok", 2_000)).await.unwrap();
        tx.send(event_at("after", 3_000)).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(probe.calls(), 1);
        let batches = probe.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].message, "after");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.conversion_failures, 1);
        assert_eq!(snapshot.lost_count, 2);
        assert_eq!(snapshot.delivered_count, 1);
    }

    #[tokio::test]
    async fn test_sink_failure_does_not_stop_loop() {
        let (sink, probe) = RecordingSink::new("flaky");
        let sink = sink.failing_first(1);
        let exporter = BatchExporter::new(sink, config(1, Duration::from_secs(3600)));
        let metrics = Arc::clone(exporter.metrics());
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(exporter.run(rx, CancellationToken::new()));

        for message in ["a", "b", "c"] {
            tx.send(LogEvent::now(message)).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(probe.calls(), 3);
        assert_eq!(probe.batch_sizes(), vec![1, 1]);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sink_failures, 1);
        assert_eq!(snapshot.lost_count, 1);
        assert_eq!(snapshot.delivered_count, 2);
    }

    #[tokio::test]
    async fn test_destination_not_found_is_reported_not_fatal() {
        let (sink, probe) = RecordingSink::new("missing");
        let sink = sink.missing_destination();
        let exporter = BatchExporter::new(sink, config(1, Duration::from_secs(3600)));
        let metrics = Arc::clone(exporter.metrics());
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(exporter.run(rx, CancellationToken::new()));

        tx.send(LogEvent::now("a")).await.unwrap();
        tx.send(LogEvent::now("b")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        // Delivery keeps being attempted for every batch.
        assert_eq!(probe.calls(), 2);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.destination_not_found, 2);
        assert_eq!(snapshot.sink_failures, 2);
    }

    #[tokio::test]
    async fn test_rejected_events_still_count_as_delivered() {
        let (sink, probe) = RecordingSink::new("picky");
        let sink = sink.with_rejected(RejectedLogEvents {
            too_new_start_index: Some(2),
            too_old_end_index: Some(0),
            expired_end_index: None,
        });
        let exporter = BatchExporter::new(sink, config(3, Duration::from_secs(3600)));
        let metrics = Arc::clone(exporter.metrics());
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(exporter.run(rx, CancellationToken::new()));

        for message in ["old", "fine", "future"] {
            tx.send(LogEvent::now(message)).await.unwrap();
        }
        drop(tx);
        handle.await.unwrap();

        assert_eq!(probe.batch_sizes(), vec![3]);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.delivered_count, 3);
        assert_eq!(snapshot.lost_count, 0);
        assert_eq!(snapshot.sink_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_put_logs_timeout() {
        let (sink, probe) = RecordingSink::new("slow");
        let sink = sink.with_delay(Duration::from_secs(10));
        let exporter = BatchExporter::new(sink, config(1, Duration::from_secs(3600)));
        let metrics = Arc::clone(exporter.metrics());
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(exporter.run(rx, CancellationToken::new()));

        let started = Instant::now();
        tx.send(LogEvent::now("stuck")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(probe.calls(), 1);
        assert!(probe.batches().is_empty());
        assert_eq!(metrics.snapshot().sink_failures, 1);
    }

    #[tokio::test]
    async fn test_cancel_drains_accepted_events() {
        let (sink, probe) = RecordingSink::new("drain");
        let exporter = BatchExporter::new(sink, config(10, Duration::from_secs(3600)));
        let (tx, rx) = mpsc::channel(16);

        for i in 0..5 {
            tx.send(LogEvent::now(format!("pending-{i}"))).await.unwrap();
        }
        let cancel = CancellationToken::new();
        cancel.cancel();

        exporter.run(rx, cancel).await;

        assert_eq!(probe.batch_sizes(), vec![5]);
        assert!(probe.closed());
        assert!(tx.send(LogEvent::now("late")).await.is_err());
    }
}
