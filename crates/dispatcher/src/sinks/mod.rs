//! Sink implementations
//!
//! Contains TracingSink, FileSink, and NetworkSink.

mod file;
mod log;
mod network;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::TracingSink;
pub use self::network::{BatchEnvelope, NetworkFormat, NetworkSink, NetworkSinkConfig};
