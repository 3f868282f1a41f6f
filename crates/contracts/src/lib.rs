//! # Contracts
//!
//! Frozen interface contracts shared by the shipper crates: log events,
//! destinations, exporter configuration and the sink trait.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Events carry a UTC wall-clock timestamp (`chrono::DateTime<Utc>`)
//! - Wire records carry milliseconds since the Unix epoch

mod blueprint;
mod destination;
mod error;
mod event;
mod export_config;
mod sink;

pub use blueprint::*;
pub use destination::LogDestination;
pub use error::*;
pub use event::{to_input_log_events, InputLogEvent, LogEvent};
pub use export_config::*;
pub use sink::*;
