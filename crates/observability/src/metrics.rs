//! Fan-out metrics
//!
//! Counters exported through the `metrics` facade, plus an in-process
//! aggregator for end-of-run summaries.

use std::fmt;

use metrics::{counter, histogram};

/// Record one incoming batch (after materialization)
pub fn record_batch_received(events: usize) {
    counter!("tagcopy_batches_total").increment(1);
    counter!("tagcopy_events_total").increment(events as u64);
    histogram!("tagcopy_batch_size").record(events as f64);
}

/// Record one batch handed to a destination
pub fn record_destination_emit(destination: &str, events: usize) {
    counter!(
        "tagcopy_destination_emits_total",
        "destination" => destination.to_string()
    )
    .increment(1);
    counter!(
        "tagcopy_destination_events_total",
        "destination" => destination.to_string()
    )
    .increment(events as u64);
}

/// Record a chain that stopped before every destination ran
pub fn record_chain_truncated() {
    counter!("tagcopy_chain_truncated_total").increment(1);
}

/// Record an emission that returned an error
pub fn record_emit_failure() {
    counter!("tagcopy_emit_failures_total").increment(1);
}

/// Running totals for one process run
#[derive(Debug, Clone, Default)]
pub struct EmitStatsAggregator {
    pub total_batches: u64,
    pub total_events: u64,
    pub failed_batches: u64,
    batch_size: RunningStats,
}

impl EmitStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one emitted batch
    pub fn update(&mut self, events: usize, success: bool) {
        self.total_batches += 1;
        self.total_events += events as u64;
        if !success {
            self.failed_batches += 1;
        }
        self.batch_size.push(events as f64);
    }

    pub fn summary(&self) -> EmitSummary {
        let failure_rate = if self.total_batches > 0 {
            self.failed_batches as f64 / self.total_batches as f64 * 100.0
        } else {
            0.0
        };

        EmitSummary {
            total_batches: self.total_batches,
            total_events: self.total_events,
            failed_batches: self.failed_batches,
            failure_rate,
            batch_size: StatsSummary::from(&self.batch_size),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Snapshot produced by [`EmitStatsAggregator::summary`]
#[derive(Debug, Clone, Default)]
pub struct EmitSummary {
    pub total_batches: u64,
    pub total_events: u64,
    pub failed_batches: u64,
    /// Percentage of failed batches
    pub failure_rate: f64,
    pub batch_size: StatsSummary,
}

impl fmt::Display for EmitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total batches: {}", self.total_batches)?;
        writeln!(f, "Total events: {}", self.total_events)?;
        writeln!(
            f,
            "Failed batches: {} ({:.2}%)",
            self.failed_batches, self.failure_rate
        )?;
        write!(f, "Batch size: {}", self.batch_size)
    }
}

/// Condensed RunningStats
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean={:.2} std={:.2} min={:.0} max={:.0} (n={})",
            self.mean, self.std_dev, self.min, self.max, self.count
        )
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
