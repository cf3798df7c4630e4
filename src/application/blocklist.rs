//! Temporary actor blocks.
//!
//! Expiry is enforced lazily: a block whose expiry has passed reads as absent
//! no matter when it is physically removed. The janitor sweep only reclaims
//! memory.

use crate::application::ports::{Clock, Storage};
use crate::domain::actor::ActorId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Expiry used when `now + duration` does not fit in an [`Instant`].
const MAX_BLOCK: Duration = Duration::from_secs(100 * 365 * 86_400);

/// Active block of one actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    /// Last instant at which the actor is still blocked
    pub expires_at: Instant,
}

impl BlockEntry {
    /// Check if the block is still in force at `now`.
    pub fn is_active(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// Registry of temporarily blocked actors.
#[derive(Clone)]
pub struct BlockRegistry<S>
where
    S: Storage<ActorId, BlockEntry> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
}

impl<S> BlockRegistry<S>
where
    S: Storage<ActorId, BlockEntry> + Clone,
{
    /// Create an empty registry.
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Block `actor` for `duration` starting now.
    ///
    /// Re-blocking overwrites the previous expiry; durations never add up.
    /// Durations too long to represent are capped at roughly a century.
    pub fn block(&self, actor: ActorId, duration: Duration) {
        let now = self.clock.now();
        let expires_at = now
            .checked_add(duration)
            .or_else(|| now.checked_add(MAX_BLOCK))
            .unwrap_or(now);
        self.storage.insert(actor, BlockEntry { expires_at });
        info!(actor = %actor, duration_secs = duration.as_secs(), "actor blocked");
    }

    /// Lift a block early. Returns whether an active block was removed.
    pub fn unblock(&self, actor: ActorId) -> bool {
        let now = self.clock.now();

        match self.storage.remove(&actor) {
            Some(entry) if entry.is_active(now) => {
                info!(actor = %actor, "actor unblocked");
                true
            }
            _ => false,
        }
    }

    /// Check if `actor` is blocked right now.
    ///
    /// An expired entry is removed on the way out, unless a concurrent
    /// `block` already replaced it with a fresh one.
    pub fn is_blocked(&self, actor: ActorId) -> bool {
        let now = self.clock.now();

        match self.storage.with_existing(&actor, |entry| entry.is_active(now)) {
            None => false,
            Some(true) => true,
            Some(false) => {
                if self.storage.remove_if(&actor, |entry| !entry.is_active(now)) {
                    info!(actor = %actor, "actor unblocked (block expired)");
                }
                false
            }
        }
    }

    /// Time left on an actor's block, if it is blocked.
    pub fn remaining(&self, actor: ActorId) -> Option<Duration> {
        let now = self.clock.now();
        self.storage
            .with_existing(&actor, |entry| entry.is_active(now).then(|| entry.expires_at - now))
            .flatten()
    }

    /// Remove every expired block.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0;

        self.storage.retain(|actor, entry| {
            let keep = entry.is_active(now);
            if !keep {
                removed += 1;
                info!(actor = %actor, "actor unblocked (block expired)");
            }
            keep
        });

        removed
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;

    type TestRegistry = BlockRegistry<Arc<ShardedStorage<ActorId, BlockEntry>>>;

    fn registry() -> (TestRegistry, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new(Instant::now()));
        let registry = BlockRegistry::new(Arc::new(ShardedStorage::new()), clock.clone());
        (registry, clock)
    }

    #[test]
    fn test_block_expires() {
        let (registry, clock) = registry();
        let actor = ActorId::new(1);

        registry.block(actor, Duration::from_millis(300_000));
        assert!(registry.is_blocked(actor));

        // Still blocked at the exact expiry instant
        clock.advance(Duration::from_millis(300_000));
        assert!(registry.is_blocked(actor));

        clock.advance(Duration::from_millis(1));
        assert!(!registry.is_blocked(actor));
    }

    #[test]
    fn test_expired_entry_removed_lazily() {
        let (registry, clock) = registry();
        let actor = ActorId::new(1);

        registry.block(actor, Duration::from_secs(10));
        clock.advance(Duration::from_secs(11));
        assert_eq!(registry.len(), 1);

        assert!(!registry.is_blocked(actor));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reblock_overwrites_instead_of_extending() {
        let (registry, clock) = registry();
        let actor = ActorId::new(1);

        registry.block(actor, Duration::from_secs(600));
        clock.advance(Duration::from_secs(60));
        registry.block(actor, Duration::from_secs(10));

        assert_eq!(registry.remaining(actor), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(11));
        assert!(!registry.is_blocked(actor));
    }

    #[test]
    fn test_unknown_actor_is_not_blocked() {
        let (registry, _clock) = registry();
        assert!(!registry.is_blocked(ActorId::new(99)));
        assert_eq!(registry.remaining(ActorId::new(99)), None);
    }

    #[test]
    fn test_unblock() {
        let (registry, clock) = registry();
        let actor = ActorId::new(1);

        registry.block(actor, Duration::from_secs(60));
        assert!(registry.unblock(actor));
        assert!(!registry.is_blocked(actor));
        assert!(!registry.unblock(actor));

        // Unblocking an already expired entry reports nothing lifted
        registry.block(actor, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));
        assert!(!registry.unblock(actor));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unrepresentable_duration_is_capped() {
        let (registry, clock) = registry();
        let actor = ActorId::new(1);

        registry.block(actor, Duration::MAX);
        assert!(registry.is_blocked(actor));
        assert!(registry.remaining(actor).unwrap() >= Duration::from_secs(365 * 86_400));

        clock.advance(Duration::from_secs(10 * 365 * 86_400));
        assert!(registry.is_blocked(actor));
        assert!(registry.unblock(actor));
    }

    #[test]
    fn test_unblock_reports_the_entry_it_removed() {
        let (registry, clock) = registry();
        let actor = ActorId::new(1);

        // An expired entry replaced by a fresh block counts as lifted
        registry.block(actor, Duration::from_secs(1));
        clock.advance(Duration::from_secs(2));
        registry.block(actor, Duration::from_secs(60));

        assert!(registry.unblock(actor));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_evict_expired_keeps_active_blocks() {
        let (registry, clock) = registry();

        registry.block(ActorId::new(1), Duration::from_secs(10));
        registry.block(ActorId::new(2), Duration::from_secs(100));
        clock.advance(Duration::from_secs(50));

        assert_eq!(registry.evict_expired(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_blocked(ActorId::new(2)));
    }

    #[test]
    fn test_concurrent_block_and_check() {
        use std::thread;

        let (registry, _clock) = registry();
        let registry = Arc::new(registry);
        let mut handles = vec![];

        for i in 0..8 {
            let registry_clone = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for j in 0..100 {
                    let actor = ActorId::new((i * 100 + j) % 50);
                    registry_clone.block(actor, Duration::from_secs(60));
                    assert!(registry_clone.is_blocked(actor));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 50);
    }
}
