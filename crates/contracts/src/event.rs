//! LogEvent - producer input and its wire record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// A single log line as handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Log text; must be non-empty to be deliverable
    pub message: String,
    /// Time the event was produced
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Create an event with an explicit timestamp
    pub fn new(message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            timestamp,
        }
    }

    /// Create an event stamped with the current wall-clock time
    pub fn now(message: impl Into<String>) -> Self {
        Self::new(message, Utc::now())
    }

    /// Wrap a raw byte payload (lossy UTF-8) stamped with the current time
    pub fn from_bytes(payload: &[u8]) -> Self {
        Self::now(String::from_utf8_lossy(payload).into_owned())
    }

    /// Convert into the record sent to a sink
    ///
    /// # Errors
    /// Returns [`ContractError::Conversion`] when the message is empty.
    pub fn to_input_log_event(&self) -> Result<InputLogEvent, ContractError> {
        if self.message.is_empty() {
            return Err(ContractError::conversion("log message is empty"));
        }

        Ok(InputLogEvent {
            timestamp: self.timestamp.timestamp_millis(),
            message: self.message.clone(),
        })
    }
}

/// Wire record accepted by a [`LogSink`](crate::LogSink)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLogEvent {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub message: String,
}

/// Convert a whole batch, failing on the first bad event
pub fn to_input_log_events(events: &[LogEvent]) -> Result<Vec<InputLogEvent>, ContractError> {
    events.iter().map(LogEvent::to_input_log_event).collect()
}
