//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use crate::application::blocklist::BlockEntry;
use crate::application::global::GlobalCounter;
use crate::application::limiter::RequestLog;
use crate::application::spam::SpamRecord;
use crate::domain::actor::{ActionKey, ActorId};
use crate::domain::audit::{AuditError, AuditEvent};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Port for obtaining current time.
///
/// This abstraction allows the application layer to work with time
/// without depending on system clock implementation details.
/// Infrastructure provides concrete implementations (SystemClock, MockClock).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for recording security-relevant events.
///
/// Recording is best-effort: the gate logs failures and never lets them
/// change an admission decision. Implementations must not block; sinks that
/// write to a database should hand events off to a background writer.
pub trait AuditSink: Send + Sync + Debug {
    /// Record one audit event.
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Port for concurrent key-value storage.
///
/// Every method that touches a single key must be atomic with respect to
/// other calls on the same key. Infrastructure provides concrete
/// implementations (ShardedStorage).
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Access an entry with mutable access, creating it if necessary.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    /// * `factory` - Function to create a new value if the key doesn't exist
    /// * `accessor` - Function that gets mutable access to the value
    ///
    /// # Returns
    /// The result from the accessor function
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Read an existing entry without creating one.
    fn with_existing<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R;

    /// Insert or overwrite a value.
    fn insert(&self, key: K, value: V);

    /// Remove an entry, returning the value that was removed.
    fn remove(&self, key: &K) -> Option<V>;

    /// Remove an entry only if the predicate holds for its current value.
    ///
    /// The predicate is evaluated under the same lock as the removal.
    fn remove_if<F>(&self, key: &K, predicate: F) -> bool
    where
        F: FnOnce(&V) -> bool;

    /// Get the number of entries in the storage.
    fn len(&self) -> usize;

    /// Check if the storage is empty.
    fn is_empty(&self) -> bool;

    /// Remove entries for which the predicate returns false.
    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool;
}

/// The four stores behind a [`SecurityGate`](crate::application::gate::SecurityGate).
///
/// Constructed once at startup and handed to the gate, which shares the
/// stores with its [`Janitor`](crate::application::janitor::Janitor).
/// Replacing this set is the way to move state into a shared store.
pub trait StoreSet {
    /// Per (actor, action) request logs
    type Requests: Storage<ActionKey, RequestLog> + Clone + 'static;
    /// Per-actor global counters
    type Counters: Storage<ActorId, GlobalCounter> + Clone + 'static;
    /// Per-actor spam records
    type Spam: Storage<ActorId, SpamRecord> + Clone + 'static;
    /// Per-actor block expiries
    type Blocks: Storage<ActorId, BlockEntry> + Clone + 'static;

    /// Handle to the request log store.
    fn requests(&self) -> Self::Requests;

    /// Handle to the global counter store.
    fn counters(&self) -> Self::Counters;

    /// Handle to the spam record store.
    fn spam(&self) -> Self::Spam;

    /// Handle to the block store.
    fn blocks(&self) -> Self::Blocks;
}
