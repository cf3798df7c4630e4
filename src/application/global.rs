//! Global per-actor throttle across all actions.
//!
//! Unlike the per-action limiter this tier uses a fixed window: one counter
//! per actor that resets wholesale once the window has elapsed. It also
//! counts before checking, so the request that crosses the limit is still
//! recorded and the counter can reach `limit + 1`.

use crate::application::ports::{Clock, Storage};
use crate::domain::actor::ActorId;
use crate::domain::policy::RateLimit;
use std::sync::Arc;
use std::time::Instant;

/// Fixed-window counter for one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalCounter {
    /// Requests counted in the current window, including rejected ones
    pub count: usize,
    /// When the current window opened
    pub window_start: Instant,
    /// Most recent request
    pub last_request: Instant,
}

impl GlobalCounter {
    /// Create a counter with an empty window opening at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
            last_request: now,
        }
    }
}

/// Combined per-actor limit over a fixed, resettable window.
#[derive(Clone)]
pub struct GlobalThrottle<S>
where
    S: Storage<ActorId, GlobalCounter> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    policy: RateLimit,
}

impl<S> GlobalThrottle<S>
where
    S: Storage<ActorId, GlobalCounter> + Clone,
{
    /// Create a throttle enforcing `policy`.
    pub fn new(storage: S, clock: Arc<dyn Clock>, policy: RateLimit) -> Self {
        Self {
            storage,
            clock,
            policy,
        }
    }

    /// Count a request from `actor` and decide whether it is within the limit.
    pub fn allow(&self, actor: ActorId) -> bool {
        let now = self.clock.now();
        let policy = self.policy;

        self.storage
            .with_entry_mut(actor, || GlobalCounter::new(now), |counter| {
                if now.saturating_duration_since(counter.window_start) > policy.window() {
                    counter.count = 0;
                    counter.window_start = now;
                }

                counter.count += 1;
                counter.last_request = now;
                counter.count <= policy.limit()
            })
    }

    /// Current counter of an actor, if one is tracked.
    pub fn counter(&self, actor: ActorId) -> Option<GlobalCounter> {
        self.storage.with_existing(&actor, |counter| *counter)
    }

    /// Remove counters whose window has elapsed.
    ///
    /// A missing counter behaves exactly like an elapsed one (the next
    /// request opens a fresh window), so removal never changes a decision.
    /// Returns the number of counters removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.policy.window();
        let mut removed = 0;

        self.storage.retain(|_, counter| {
            let keep = now.saturating_duration_since(counter.window_start) <= window;
            if !keep {
                removed += 1;
            }
            keep
        });

        removed
    }

    /// Number of tracked actors.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no actors are tracked.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Get the enforced policy.
    pub fn policy(&self) -> &RateLimit {
        &self.policy
    }
}
