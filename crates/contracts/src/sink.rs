//! LogSink trait - Exporter output interface
//!
//! Defines the abstract interface for delivering batches to a log backend.

use serde::{Deserialize, Serialize};

use crate::{ContractError, InputLogEvent, LogDestination};

/// Log delivery trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(LogSink: Send)]
pub trait LocalLogSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one batch to the destination
    ///
    /// An empty batch is a no-op that returns `Ok`.
    ///
    /// # Errors
    /// [`ContractError::DestinationNotFound`] when the group or stream does
    /// not exist, any other variant for remaining failures.
    async fn put_logs(
        &mut self,
        destination: &LogDestination,
        events: &[InputLogEvent],
    ) -> Result<PutLogsResponse, ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}

/// Result of an accepted put logs call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutLogsResponse {
    /// Events the backend refused individually
    #[serde(default)]
    pub rejected: Option<RejectedLogEvents>,
}

impl PutLogsResponse {
    pub fn accepted() -> Self {
        Self::default()
    }
}

/// Indices of refused events within a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedLogEvents {
    /// First index of events too far in the future
    pub too_new_start_index: Option<usize>,
    /// Last index of events too far in the past
    pub too_old_end_index: Option<usize>,
    /// Last index of events older than the retention period
    pub expired_end_index: Option<usize>,
}
