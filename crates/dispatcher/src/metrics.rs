//! Destination metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single destination
#[derive(Debug, Default)]
pub struct DestinationMetrics {
    /// Batches handed to the destination
    emit_count: AtomicU64,
    /// Events handed to the destination
    event_count: AtomicU64,
    /// Batches delivered as a private copy
    copy_count: AtomicU64,
}

impl DestinationMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total emit count
    pub fn emit_count(&self) -> u64 {
        self.emit_count.load(Ordering::Relaxed)
    }

    /// Get total event count
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::Relaxed)
    }

    /// Get copied batch count
    pub fn copy_count(&self) -> u64 {
        self.copy_count.load(Ordering::Relaxed)
    }

    /// Record one batch handed to the destination
    pub fn record_emit(&self, events: usize, copied: bool) {
        self.emit_count.fetch_add(1, Ordering::Relaxed);
        self.event_count.fetch_add(events as u64, Ordering::Relaxed);
        if copied {
            self.copy_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            emit_count: self.emit_count(),
            event_count: self.event_count(),
            copy_count: self.copy_count(),
        }
    }
}

/// Snapshot of destination metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub emit_count: u64,
    pub event_count: u64,
    pub copy_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_emit() {
        let metrics = DestinationMetrics::new();
        metrics.record_emit(3, false);
        metrics.record_emit(2, true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.emit_count, 2);
        assert_eq!(snapshot.event_count, 5);
        assert_eq!(snapshot.copy_count, 1);
    }
}
