//! Observability metrics for admission decisions.
//!
//! Provides counters of how events were decided and how much state the
//! janitor reclaimed, for monitoring and debugging.

use crate::domain::decision::Decision;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking admission statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug, Default)]
struct MetricsInner {
    admitted: AtomicU64,
    blocked: AtomicU64,
    global_limited: AtomicU64,
    spam_blocked: AtomicU64,
    action_limited: AtomicU64,
    entries_evicted: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record the outcome of one evaluation.
    pub(crate) fn record_decision(&self, decision: &Decision) {
        let counter = match decision {
            Decision::Admit => &self.inner.admitted,
            Decision::RejectBlocked => &self.inner.blocked,
            Decision::RejectGlobalLimit { .. } => &self.inner.global_limited,
            Decision::RejectSpam { .. } => &self.inner.spam_blocked,
            Decision::RejectActionLimit { .. } => &self.inner.action_limited,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record entries removed by a janitor sweep.
    pub(crate) fn record_evictions(&self, count: usize) {
        self.inner
            .entries_evicted
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Events admitted.
    pub fn admitted(&self) -> u64 {
        self.inner.admitted.load(Ordering::Relaxed)
    }

    /// Events dropped because the actor was blocked.
    pub fn blocked(&self) -> u64 {
        self.inner.blocked.load(Ordering::Relaxed)
    }

    /// Events rejected by the global throttle.
    pub fn global_limited(&self) -> u64 {
        self.inner.global_limited.load(Ordering::Relaxed)
    }

    /// Events rejected as spam.
    pub fn spam_blocked(&self) -> u64 {
        self.inner.spam_blocked.load(Ordering::Relaxed)
    }

    /// Events rejected by a per-action limit.
    pub fn action_limited(&self) -> u64 {
        self.inner.action_limited.load(Ordering::Relaxed)
    }

    /// Store entries removed by the janitor.
    pub fn entries_evicted(&self) -> u64 {
        self.inner.entries_evicted.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            admitted: self.admitted(),
            blocked: self.blocked(),
            global_limited: self.global_limited(),
            spam_blocked: self.spam_blocked(),
            action_limited: self.action_limited(),
            entries_evicted: self.entries_evicted(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Events admitted
    pub admitted: u64,
    /// Events dropped for blocked actors
    pub blocked: u64,
    /// Events rejected by the global throttle
    pub global_limited: u64,
    /// Events rejected as spam
    pub spam_blocked: u64,
    /// Events rejected by per-action limits
    pub action_limited: u64,
    /// Store entries removed by the janitor
    pub entries_evicted: u64,
}

impl MetricsSnapshot {
    /// Total rejected events.
    pub fn rejected(&self) -> u64 {
        self.blocked
            .saturating_add(self.global_limited)
            .saturating_add(self.spam_blocked)
            .saturating_add(self.action_limited)
    }

    /// Total evaluated events (admitted + rejected).
    pub fn total_events(&self) -> u64 {
        self.admitted.saturating_add(self.rejected())
    }

    /// Ratio of rejected to total events (0.0 to 1.0).
    ///
    /// Returns 0.0 if no events have been evaluated.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_events();
        if total == 0 {
            0.0
        } else {
            self.rejected() as f64 / total as f64
        }
    }
}
