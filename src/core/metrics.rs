//! Bridge metrics for observability
//!
//! Counters for monitoring bridge health: how many loggers were built,
//! how many records and events went out, and how often writes or backend
//! flushes failed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for bridge observability
///
/// # Example
///
/// ```
/// use rust_logger_bridge::BridgeMetrics;
///
/// let metrics = BridgeMetrics::new();
///
/// metrics.record_written();
/// metrics.record_event_reported();
///
/// assert_eq!(metrics.records_written(), 1);
/// assert_eq!(metrics.events_reported(), 1);
/// ```
#[derive(Debug)]
pub struct BridgeMetrics {
    /// Number of multi-sink loggers built by hubs
    loggers_constructed: AtomicU64,

    /// Records handed to at least one sink without error
    records_written: AtomicU64,

    /// Events submitted to the backend scope
    events_reported: AtomicU64,

    /// Records for which some sink reported an error
    write_failures: AtomicU64,

    /// Backend flushes that ran out of time
    sync_timeouts: AtomicU64,
}

impl BridgeMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            loggers_constructed: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            events_reported: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            sync_timeouts: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn loggers_constructed(&self) -> u64 {
        self.loggers_constructed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn events_reported(&self) -> u64 {
        self.events_reported.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sync_timeouts(&self) -> u64 {
        self.sync_timeouts.load(Ordering::Relaxed)
    }

    /// Record a logger construction, returning the previous count
    #[inline]
    pub fn record_logger_constructed(&self) -> u64 {
        self.loggers_constructed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.records_written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_event_reported(&self) -> u64 {
        self.events_reported.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sync_timeout(&self) -> u64 {
        self.sync_timeouts.fetch_add(1, Ordering::Relaxed)
    }

    /// Get failure rate of writes as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.write_failures() as f64;
        let total = self.records_written() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.loggers_constructed.store(0, Ordering::Relaxed);
        self.records_written.store(0, Ordering::Relaxed);
        self.events_reported.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
        self.sync_timeouts.store(0, Ordering::Relaxed);
    }
}

impl Default for BridgeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for BridgeMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            loggers_constructed: AtomicU64::new(self.loggers_constructed()),
            records_written: AtomicU64::new(self.records_written()),
            events_reported: AtomicU64::new(self.events_reported()),
            write_failures: AtomicU64::new(self.write_failures()),
            sync_timeouts: AtomicU64::new(self.sync_timeouts()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = BridgeMetrics::new();
        assert_eq!(metrics.loggers_constructed(), 0);
        assert_eq!(metrics.records_written(), 0);
        assert_eq!(metrics.events_reported(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.sync_timeouts(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = BridgeMetrics::new();
        assert_eq!(metrics.record_logger_constructed(), 0);
        assert_eq!(metrics.record_logger_constructed(), 1);
        assert_eq!(metrics.loggers_constructed(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = BridgeMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written();
        }
        for _ in 0..10 {
            metrics.record_write_failure();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_reset_and_snapshot() {
        let metrics = BridgeMetrics::new();
        metrics.record_event_reported();
        metrics.record_sync_timeout();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.events_reported(), 0);
        assert_eq!(snapshot.events_reported(), 1);
        assert_eq!(snapshot.sync_timeouts(), 1);
    }
}
