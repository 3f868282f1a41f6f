//! Shipper orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Shipper, ShipperConfig};
pub use stats::ShipperStats;
