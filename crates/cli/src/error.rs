//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Command-line override produced an invalid configuration
    #[error("Invalid override: {message}")]
    InvalidOverride { message: String },

    /// Input file could not be opened
    #[error("Failed to open input {path}: {message}")]
    InputOpen { path: String, message: String },

    /// Input reader thread ended abnormally
    #[error("Input reader failed: {message}")]
    InputReader { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_override(message: impl Into<String>) -> Self {
        Self::InvalidOverride {
            message: message.into(),
        }
    }

    pub fn input_open(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InputOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn input_reader(message: impl Into<String>) -> Self {
        Self::InputReader {
            message: message.into(),
        }
    }
}
