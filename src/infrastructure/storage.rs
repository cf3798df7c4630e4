//! In-memory storage for limiter state.
//!
//! Provides concurrent, sharded storage and the default set of stores used
//! by the gate.

use crate::application::blocklist::BlockEntry;
use crate::application::global::GlobalCounter;
use crate::application::limiter::RequestLog;
use crate::application::ports::{Storage, StoreSet};
use crate::application::spam::SpamRecord;
use crate::domain::actor::{ActionKey, ActorId};
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Thread-safe sharded storage backed by DashMap.
///
/// DashMap provides lock-free reads and fine-grained locking for writes.
/// Every single-key operation holds the shard lock for its whole duration,
/// which is what makes read-check-record sequences atomic per key.
#[derive(Debug)]
pub struct ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    map: DashMap<K, V>,
}

impl<K, V> ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a new sharded storage instance.
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }
}

impl<K, V> Default for ShardedStorage<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Storage<K, V> for ShardedStorage<K, V>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        let entry = self.map.entry(key);
        let mut value_ref = entry.or_insert_with(factory);
        accessor(&mut value_ref)
    }

    fn with_existing<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        self.map.get(key).map(|value| accessor(&value))
    }

    fn insert(&self, key: K, value: V) {
        self.map.insert(key, value);
    }

    fn remove(&self, key: &K) -> Option<V> {
        self.map.remove(key).map(|(_, value)| value)
    }

    fn remove_if<F>(&self, key: &K, predicate: F) -> bool
    where
        F: FnOnce(&V) -> bool,
    {
        self.map.remove_if(key, |_, value| predicate(value)).is_some()
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.map.retain(f);
    }
}

// Implement Storage for Arc<ShardedStorage> so handles can be shared
impl<K, V> Storage<K, V> for Arc<ShardedStorage<K, V>>
where
    K: Hash + Eq + Clone + Send + Sync + Debug,
    V: Send + Sync + Debug,
{
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        (**self).with_entry_mut(key, factory, accessor)
    }

    fn with_existing<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&V) -> R,
    {
        (**self).with_existing(key, accessor)
    }

    fn insert(&self, key: K, value: V) {
        (**self).insert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        (**self).remove(key)
    }

    fn remove_if<F>(&self, key: &K, predicate: F) -> bool
    where
        F: FnOnce(&V) -> bool,
    {
        (**self).remove_if(key, predicate)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn retain<F>(&self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        (**self).retain(f)
    }
}

/// Process-local stores, one [`ShardedStorage`] per kind of state.
///
/// Clones share the same maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStores {
    requests: Arc<ShardedStorage<ActionKey, RequestLog>>,
    counters: Arc<ShardedStorage<ActorId, GlobalCounter>>,
    spam: Arc<ShardedStorage<ActorId, SpamRecord>>,
    blocks: Arc<ShardedStorage<ActorId, BlockEntry>>,
}

impl InMemoryStores {
    /// Create an empty set of stores.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreSet for InMemoryStores {
    type Requests = Arc<ShardedStorage<ActionKey, RequestLog>>;
    type Counters = Arc<ShardedStorage<ActorId, GlobalCounter>>;
    type Spam = Arc<ShardedStorage<ActorId, SpamRecord>>;
    type Blocks = Arc<ShardedStorage<ActorId, BlockEntry>>;

    fn requests(&self) -> Self::Requests {
        Arc::clone(&self.requests)
    }

    fn counters(&self) -> Self::Counters {
        Arc::clone(&self.counters)
    }

    fn spam(&self) -> Self::Spam {
        Arc::clone(&self.spam)
    }

    fn blocks(&self) -> Self::Blocks {
        Arc::clone(&self.blocks)
    }
}
