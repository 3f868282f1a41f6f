//! TracingSink - writes each record through tracing

use contracts::{ContractError, InputLogEvent, LogDestination, LogSink, PutLogsResponse};
use tracing::{info, instrument};

/// Sink that emits every record as a tracing event
///
/// Useful for local runs and debugging; it always succeeds.
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    /// Create a new TracingSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LogSink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "tracing_sink_put_logs",
        skip(self, destination, events),
        fields(sink = %self.name, destination = %destination, events = events.len())
    )]
    async fn put_logs(
        &mut self,
        destination: &LogDestination,
        events: &[InputLogEvent],
    ) -> Result<PutLogsResponse, ContractError> {
        for event in events {
            info!(
                sink = %self.name,
                group = %destination.group_name,
                stream = %destination.stream_name,
                timestamp = event.timestamp,
                message = %event.message,
                "Log event"
            );
        }
        Ok(PutLogsResponse::accepted())
    }

    #[instrument(name = "tracing_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "TracingSink closed");
        Ok(())
    }
}
