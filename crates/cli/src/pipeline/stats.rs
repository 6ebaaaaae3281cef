//! Run statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;
use observability::EmitStatsAggregator;

/// What one `run` did
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Batch totals across the run
    pub emits: EmitStatsAggregator,

    /// Per-destination counters, in chain order
    pub destinations: Vec<(String, MetricsSnapshot)>,

    /// Wall-clock time of the run
    pub duration: Duration,
}

impl RunStats {
    /// Events dispatched per second
    pub fn events_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.emits.total_events as f64 / secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let summary = self.emits.summary();

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Fan-out Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Batches: {}", summary.total_batches);
        println!("   ├─ Events: {}", summary.total_events);
        println!(
            "   ├─ Failed batches: {} ({:.2}%)",
            summary.failed_batches, summary.failure_rate
        );
        println!("   ├─ Batch size: {}", summary.batch_size);
        println!("   └─ Events/s: {:.2}", self.events_per_sec());

        if !self.destinations.is_empty() {
            println!("\n📤 Destinations ({})", self.destinations.len());
            for (i, (name, snapshot)) in self.destinations.iter().enumerate() {
                let prefix = if i == self.destinations.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!(
                    "   {} {}: {} emits, {} events, {} copies",
                    prefix, name, snapshot.emit_count, snapshot.event_count, snapshot.copy_count
                );
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_per_sec() {
        let mut stats = RunStats::default();
        assert_eq!(stats.events_per_sec(), 0.0);

        stats.emits.update(10, true);
        stats.emits.update(30, true);
        stats.duration = Duration::from_secs(2);
        assert!((stats.events_per_sec() - 20.0).abs() < f64::EPSILON);
    }
}
