//! In-memory sink shared by the unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{
    ContractError, InputLogEvent, LogDestination, LogSink, PutLogsResponse, RejectedLogEvents,
};

/// Sink recording every accepted batch
pub(crate) struct RecordingSink {
    name: String,
    probe: SinkProbe,
    failures_left: usize,
    missing_destination: bool,
    delay: Duration,
    rejected: Option<RejectedLogEvents>,
}

/// Read side of a [`RecordingSink`], kept by the test after the sink moves
#[derive(Clone, Default)]
pub(crate) struct SinkProbe {
    batches: Arc<Mutex<Vec<Vec<InputLogEvent>>>>,
    destinations: Arc<Mutex<Vec<LogDestination>>>,
    calls: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl RecordingSink {
    pub(crate) fn new(name: &str) -> (Self, SinkProbe) {
        let probe = SinkProbe::default();
        let sink = Self {
            name: name.to_string(),
            probe: probe.clone(),
            failures_left: 0,
            missing_destination: false,
            delay: Duration::ZERO,
            rejected: None,
        };
        (sink, probe)
    }

    pub(crate) fn failing_first(mut self, calls: usize) -> Self {
        self.failures_left = calls;
        self
    }

    pub(crate) fn missing_destination(mut self) -> Self {
        self.missing_destination = true;
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Accept every batch but report `rejected` in each response
    pub(crate) fn with_rejected(mut self, rejected: RejectedLogEvents) -> Self {
        self.rejected = Some(rejected);
        self
    }
}

impl LogSink for RecordingSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put_logs(
        &mut self,
        destination: &LogDestination,
        events: &[InputLogEvent],
    ) -> Result<PutLogsResponse, ContractError> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.missing_destination {
            return Err(ContractError::destination_not_found(
                destination.to_string(),
                "group does not exist",
            ));
        }
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(ContractError::put_logs(&self.name, "injected failure"));
        }

        self.probe.batches.lock().unwrap().push(events.to_vec());
        self.probe
            .destinations
            .lock()
            .unwrap()
            .push(destination.clone());
        Ok(PutLogsResponse {
            rejected: self.rejected.clone(),
        })
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.probe.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl SinkProbe {
    pub(crate) fn batches(&self) -> Vec<Vec<InputLogEvent>> {
        self.batches.lock().unwrap().clone()
    }

    pub(crate) fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flatten()
            .map(|event| event.message.clone())
            .collect()
    }

    pub(crate) fn destinations(&self) -> Vec<LogDestination> {
        self.destinations.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
