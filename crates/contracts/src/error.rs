//! Layered error definitions
//!
//! Categorized by source: config / conversion / sink

use std::time::Duration;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Conversion Errors =====
    /// Event could not be turned into a wire record
    #[error("log event conversion error: {message}")]
    Conversion { message: String },

    // ===== Sink Errors =====
    /// Destination group or stream does not exist
    #[error("log destination '{destination}' not found: {message}")]
    DestinationNotFound {
        destination: String,
        message: String,
    },

    /// Put logs call failed
    #[error("sink '{sink_name}' put logs error: {message}")]
    PutLogs { sink_name: String, message: String },

    /// Put logs call did not finish in time
    #[error("sink '{sink_name}' put logs timed out after {timeout:?}")]
    Timeout { sink_name: String, timeout: Duration },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create conversion error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create destination-not-found error
    pub fn destination_not_found(
        destination: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::DestinationNotFound {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create put logs error
    pub fn put_logs(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PutLogs {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink connection error
    pub fn sink_connection(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkConnection {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether the sink reported a missing destination
    pub fn is_destination_not_found(&self) -> bool {
        matches!(self, Self::DestinationNotFound { .. })
    }

    /// Short label used for metrics and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } => "config",
            Self::Conversion { .. } => "conversion",
            Self::DestinationNotFound { .. } => "destination_not_found",
            Self::Timeout { .. } => "timeout",
            Self::PutLogs { .. } | Self::SinkConnection { .. } | Self::Io(_) => "transient",
        }
    }
}
