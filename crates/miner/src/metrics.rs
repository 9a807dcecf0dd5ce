//! Metrics — lock-free counters for the runner.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Forces the wrapped group onto its own cache line so workers updating
/// different groups do not contend.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Input line counters (updated by the reader)
#[derive(Debug, Default)]
pub struct InputMetrics {
    pub lines: AtomicU64,
    pub skipped: AtomicU64,
}

/// Per-record outcomes (updated by workers)
#[derive(Debug, Default)]
pub struct OutcomeMetrics {
    pub matched: AtomicU64,
    pub discovered: AtomicU64,
    pub unmatched: AtomicU64,
}

/// Batch totals
#[derive(Debug, Default)]
pub struct BatchMetrics {
    pub batches: AtomicU64,
    pub time_nanos: AtomicU64,
}

/// All `Ordering::Relaxed`; a snapshot may tear across groups.
#[derive(Debug, Default)]
pub struct MinerMetrics {
    pub input: CacheAligned<InputMetrics>,
    pub outcomes: CacheAligned<OutcomeMetrics>,
    pub batches: CacheAligned<BatchMetrics>,
}

impl MinerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_line(&self) {
        self.input.0.lines.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_skipped(&self) {
        self.input.0.skipped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_matched(&self, discovered: bool) {
        if discovered {
            self.outcomes.0.discovered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.outcomes.0.matched.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn record_unmatched(&self) {
        self.outcomes.0.unmatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, time_nanos: u64) {
        self.batches.0.batches.fetch_add(1, Ordering::Relaxed);
        self.batches.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let batches = self.batches.0.batches.load(Ordering::Relaxed);
        let time_nanos = self.batches.0.time_nanos.load(Ordering::Relaxed);
        MetricsSnapshot {
            lines_read: self.input.0.lines.load(Ordering::Relaxed),
            lines_skipped: self.input.0.skipped.load(Ordering::Relaxed),
            matched: self.outcomes.0.matched.load(Ordering::Relaxed),
            discovered: self.outcomes.0.discovered.load(Ordering::Relaxed),
            unmatched: self.outcomes.0.unmatched.load(Ordering::Relaxed),
            batches,
            avg_batch_time_ms: if batches > 0 {
                time_nanos as f64 / batches as f64 / 1_000_000.0
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub lines_skipped: u64,
    pub matched: u64,
    pub discovered: u64,
    pub unmatched: u64,
    pub batches: u64,
    pub avg_batch_time_ms: f64,
}
