//! Per-action sliding window rate limiting.
//!
//! Each (actor, action) pair owns a log of accepted request timestamps. A
//! request is accepted while fewer than `limit` accepted requests fall inside
//! the trailing window. Rejected requests never touch the log, so probing a
//! saturated action does not push its recovery further out.

use crate::application::ports::{Clock, Storage};
use crate::domain::actor::{ActionKey, ActorId};
use crate::domain::policy::PolicyTable;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Timestamps of accepted requests for one action key, oldest first.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    timestamps: VecDeque<Instant>,
}

impl RequestLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first timestamp still inside the window.
    fn window_start(&self, now: Instant, window: Duration) -> usize {
        self.timestamps
            .partition_point(|&t| now.saturating_duration_since(t) >= window)
    }

    /// Number of timestamps inside the window, without pruning.
    pub fn active_count(&self, now: Instant, window: Duration) -> usize {
        self.timestamps.len() - self.window_start(now, window)
    }

    /// Drop timestamps that fell out of the window.
    pub fn prune(&mut self, now: Instant, window: Duration) {
        let expired = self.window_start(now, window);
        self.timestamps.drain(..expired);
    }

    /// Append an accepted request.
    pub fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }

    /// Number of stored timestamps, including stale ones not yet pruned.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the log holds no timestamps.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Sliding window limiter keyed by (actor, action).
///
/// Generic over the storage backend; in production use
/// `Arc<ShardedStorage<ActionKey, RequestLog>>`.
#[derive(Clone)]
pub struct SlidingWindowLimiter<S>
where
    S: Storage<ActionKey, RequestLog> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    policies: Arc<PolicyTable>,
}

impl<S> SlidingWindowLimiter<S>
where
    S: Storage<ActionKey, RequestLog> + Clone,
{
    /// Create a limiter using the action policies of `policies`.
    pub fn new(storage: S, clock: Arc<dyn Clock>, policies: Arc<PolicyTable>) -> Self {
        Self {
            storage,
            clock,
            policies,
        }
    }

    /// Decide whether `actor` may perform `action` now.
    ///
    /// Unknown action names are limited by the table's default policy.
    /// Accepting records the request; rejecting leaves the log untouched.
    pub fn allow(&self, actor: ActorId, action: &str) -> bool {
        let policy = *self.policies.action(action);
        let now = self.clock.now();

        self.storage
            .with_entry_mut(ActionKey::new(actor, action), RequestLog::new, |log| {
                if log.active_count(now, policy.window()) >= policy.limit() {
                    return false;
                }
                log.prune(now, policy.window());
                log.record(now);
                true
            })
    }

    /// Requests still available to `actor` for `action` in the current window.
    pub fn remaining(&self, actor: ActorId, action: &str) -> usize {
        let policy = *self.policies.action(action);
        let now = self.clock.now();
        let used = self
            .storage
            .with_existing(&ActionKey::new(actor, action), |log| {
                log.active_count(now, policy.window())
            })
            .unwrap_or(0);
        policy.limit().saturating_sub(used)
    }

    /// Prune every log and remove the ones left empty.
    ///
    /// Returns the number of logs removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        self.storage.retain(|key, log| {
            log.prune(now, self.policies.action(&key.action).window());
            let keep = !log.is_empty();
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Number of tracked (actor, action) logs.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no logs are tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the policy table.
    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }
}
