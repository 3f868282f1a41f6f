//! ExportConfig - batching and delivery settings for one exporter
//!
//! Only constructible through [`ExportConfigBuilder::build`], which rejects
//! invalid values up front.

use std::time::Duration;

use crate::{ContractError, LogDestination};

/// Default number of events per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;
/// Default periodic flush interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
/// Default hand-off queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;
/// Default bound on a single put logs call
pub const DEFAULT_PUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Validated exporter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    batch_size: usize,
    interval: Duration,
    destination: LogDestination,
    ordered_logs: bool,
    queue_capacity: usize,
    put_timeout: Duration,
}

impl ExportConfig {
    /// Start building a configuration from defaults
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Buffer length that triggers a flush (always >= 1)
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Periodic flush interval (always > 0)
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn destination(&self) -> &LogDestination {
        &self.destination
    }

    /// Sort each batch by timestamp before delivery
    pub fn ordered_logs(&self) -> bool {
        self.ordered_logs
    }

    /// Capacity of the producer hand-off queue
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Timeout applied to every put logs call
    pub fn put_timeout(&self) -> Duration {
        self.put_timeout
    }
}

/// Builder for [`ExportConfig`]
#[derive(Debug, Clone)]
pub struct ExportConfigBuilder {
    batch_size: usize,
    interval: Duration,
    destination: LogDestination,
    ordered_logs: bool,
    queue_capacity: usize,
    put_timeout: Duration,
}

impl Default for ExportConfigBuilder {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            interval: DEFAULT_INTERVAL,
            destination: LogDestination::new("", ""),
            ordered_logs: false,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            put_timeout: DEFAULT_PUT_TIMEOUT,
        }
    }
}

impl ExportConfigBuilder {
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn group_name(mut self, name: impl Into<String>) -> Self {
        self.destination.group_name = name.into();
        self
    }

    pub fn stream_name(mut self, name: impl Into<String>) -> Self {
        self.destination.stream_name = name.into();
        self
    }

    pub fn destination(mut self, destination: LogDestination) -> Self {
        self.destination = destination;
        self
    }

    pub fn ordered_logs(mut self, enabled: bool) -> Self {
        self.ordered_logs = enabled;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn put_timeout(mut self, timeout: Duration) -> Self {
        self.put_timeout = timeout;
        self
    }

    /// Validate and produce the configuration
    ///
    /// # Errors
    /// Returns [`ContractError::ConfigValidation`] for a zero batch size,
    /// queue capacity, interval or put timeout.
    pub fn build(self) -> Result<ExportConfig, ContractError> {
        if self.batch_size < 1 {
            return Err(ContractError::config_validation(
                "batch_size",
                "batch size must be >= 1",
            ));
        }
        if self.interval.is_zero() {
            return Err(ContractError::config_validation(
                "interval",
                "interval must be > 0",
            ));
        }
        if self.queue_capacity < 1 {
            return Err(ContractError::config_validation(
                "queue_capacity",
                "queue capacity must be >= 1",
            ));
        }
        if self.put_timeout.is_zero() {
            return Err(ContractError::config_validation(
                "put_timeout",
                "put timeout must be > 0",
            ));
        }

        Ok(ExportConfig {
            batch_size: self.batch_size,
            interval: self.interval,
            destination: self.destination,
            ordered_logs: self.ordered_logs,
            queue_capacity: self.queue_capacity,
            put_timeout: self.put_timeout,
        })
    }
}
