//! Shipper run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;

/// Statistics from a shipper run
#[derive(Debug, Clone, Default)]
pub struct ShipperStats {
    /// Lines read from the input and handed to the dispatcher
    pub lines_read: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Run ended by a shutdown signal rather than end of input
    pub interrupted: bool,

    /// Final exporter counters
    pub metrics: MetricsSnapshot,
}

impl ShipperStats {
    /// Input throughput in lines per second
    pub fn lines_per_sec(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.lines_read as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Lost events as a percentage of received events
    pub fn loss_rate(&self) -> f64 {
        let received = self.metrics.received_count + self.metrics.lost_count;
        if received > 0 {
            (self.metrics.lost_count as f64 / received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Shipper Statistics ===\n");

        println!("Overview");
        println!("   Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   Lines read: {}", self.lines_read);
        println!("   Lines/s: {:.2}", self.lines_per_sec());
        println!("   Interrupted: {}", self.interrupted);

        let m = &self.metrics;
        println!("\nDelivery");
        println!("   Events received: {}", m.received_count);
        println!("   Batches flushed: {}", m.batch_count);
        println!("   Events delivered: {}", m.delivered_count);
        println!("   Events lost: {} ({:.2}%)", m.lost_count, self.loss_rate());

        if m.conversion_failures + m.sink_failures > 0 {
            println!("\nFailures");
            println!("   Conversion: {}", m.conversion_failures);
            println!("   Sink: {}", m.sink_failures);
            println!("   Destination not found: {}", m.destination_not_found);
        }

        println!();
    }
}
