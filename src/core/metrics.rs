//! Logger metrics for observability
//!
//! Counters for records queued, records persisted, sink failures and timer
//! ticks. All counters are relaxed atomics shared between caller threads and
//! the writer thread.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use diary::DiaryMetrics;
///
/// let metrics = DiaryMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_written();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.written(), 1);
/// assert_eq!(metrics.pending(), 0);
/// ```
#[derive(Debug)]
pub struct DiaryMetrics {
    /// Records handed to the delivery queue
    enqueued: AtomicU64,

    /// Records that reached every sink without error
    written: AtomicU64,

    /// Records for which at least one sink failed
    failed: AtomicU64,

    /// Individual sink writes that failed or panicked
    write_failures: AtomicU64,

    /// Timer callbacks run
    timer_ticks: AtomicU64,
}

impl DiaryMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            timer_ticks: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn timer_ticks(&self) -> u64 {
        self.timer_ticks.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_failure(&self) -> u64 {
        self.write_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_timer_tick(&self) -> u64 {
        self.timer_ticks.fetch_add(1, Ordering::Relaxed)
    }

    /// Queued records the writer has not finished yet (approximate while running)
    pub fn pending(&self) -> u64 {
        self.enqueued()
            .saturating_sub(self.written() + self.failed())
    }
}

impl Default for DiaryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DiaryMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            written: AtomicU64::new(self.written()),
            failed: AtomicU64::new(self.failed()),
            write_failures: AtomicU64::new(self.write_failures()),
            timer_ticks: AtomicU64::new(self.timer_ticks()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = DiaryMetrics::new();
        assert_eq!(metrics.enqueued(), 0);
        assert_eq!(metrics.written(), 0);
        assert_eq!(metrics.failed(), 0);
        assert_eq!(metrics.write_failures(), 0);
        assert_eq!(metrics.timer_ticks(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = DiaryMetrics::new();
        assert_eq!(metrics.record_write_failure(), 0);
        assert_eq!(metrics.record_write_failure(), 1);
        assert_eq!(metrics.write_failures(), 2);
    }

    #[test]
    fn test_pending() {
        let metrics = DiaryMetrics::new();
        for _ in 0..5 {
            metrics.record_enqueued();
        }
        metrics.record_written();
        metrics.record_written();
        metrics.record_failed();
        assert_eq!(metrics.pending(), 2);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = DiaryMetrics::new();
        metrics.record_enqueued();

        let snapshot = metrics.clone();
        metrics.record_enqueued();
        assert_eq!(snapshot.enqueued(), 1);
        assert_eq!(metrics.enqueued(), 2);
    }
}
