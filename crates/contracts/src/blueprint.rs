//! ShipperBlueprint - Config Loader output
//!
//! Describes a complete shipper setup: destination, batching policy, sink routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::{
    ContractError, ExportConfig, LogDestination, DEFAULT_BATCH_SIZE, DEFAULT_INTERVAL,
    DEFAULT_PUT_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete shipper configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipperBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Remote log target
    pub destination: DestinationConfig,

    /// Batching policy
    #[serde(default)]
    pub export: ExportSettings,

    /// Output routing
    pub sink: SinkConfig,
}

/// Destination section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub group_name: String,
    pub stream_name: String,
}

/// Batching and delivery section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Events per batch, must be >= 1
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Periodic flush interval (milliseconds), must be > 0
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Sort batches by timestamp before delivery
    #[serde(default)]
    pub ordered_logs: bool,

    /// Hand-off queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Timeout for a single put logs call (milliseconds)
    #[serde(default = "default_put_timeout_ms")]
    pub put_timeout_ms: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            interval_ms: default_interval_ms(),
            ordered_logs: false,
            queue_capacity: default_queue_capacity(),
            put_timeout_ms: default_put_timeout_ms(),
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL.as_millis() as u64
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_put_timeout_ms() -> u64 {
    DEFAULT_PUT_TIMEOUT.as_millis() as u64
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Tracing output
    Log,
    /// JSON lines on disk
    File,
    /// UDP datagrams
    Network,
}

impl ShipperBlueprint {
    pub fn log_destination(&self) -> LogDestination {
        LogDestination::new(
            self.destination.group_name.clone(),
            self.destination.stream_name.clone(),
        )
    }

    /// Build the validated exporter configuration
    ///
    /// # Errors
    /// Propagates [`ContractError::ConfigValidation`] from the builder.
    pub fn to_export_config(&self) -> Result<ExportConfig, ContractError> {
        let export = &self.export;
        ExportConfig::builder()
            .destination(self.log_destination())
            .batch_size(export.batch_size)
            .interval(Duration::from_millis(export.interval_ms))
            .ordered_logs(export.ordered_logs)
            .queue_capacity(export.queue_capacity)
            .put_timeout(Duration::from_millis(export.put_timeout_ms))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_blueprint() -> ShipperBlueprint {
        ShipperBlueprint {
            version: ConfigVersion::V1,
            destination: DestinationConfig {
                group_name: "app".into(),
                stream_name: "web-1".into(),
            },
            export: ExportSettings::default(),
            sink: SinkConfig {
                name: "console".into(),
                sink_type: SinkType::Log,
                params: HashMap::new(),
            },
        }
    }

    #[test]
    fn export_config_defaults() {
        let config = sample_blueprint().to_export_config().unwrap();
        assert_eq!(config.batch_size(), 5);
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(config.put_timeout(), Duration::from_secs(5));
        assert_eq!(config.destination().to_string(), "app/web-1");
    }

    #[test]
    fn export_config_overrides() {
        let mut blueprint = sample_blueprint();
        blueprint.export.batch_size = 50;
        blueprint.export.interval_ms = 250;
        blueprint.export.ordered_logs = true;
        blueprint.export.queue_capacity = 16;

        let config = blueprint.to_export_config().unwrap();
        assert_eq!(config.batch_size(), 50);
        assert_eq!(config.interval(), Duration::from_millis(250));
        assert!(config.ordered_logs());
        assert_eq!(config.queue_capacity(), 16);
    }

    #[test]
    fn export_config_rejects_zero_batch() {
        let mut blueprint = sample_blueprint();
        blueprint.export.batch_size = 0;
        assert!(blueprint.to_export_config().is_err());
    }

    #[test]
    fn export_section_is_optional() {
        let json = r#"{
            "destination": { "group_name": "app", "stream_name": "s" },
            "sink": { "name": "console", "sink_type": "log" }
        }"#;
        let blueprint: ShipperBlueprint = serde_json::from_str(json).unwrap();
        assert_eq!(blueprint.export.batch_size, 5);
        assert_eq!(blueprint.export.queue_capacity, 1024);
    }
}
