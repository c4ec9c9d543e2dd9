//! Sliding-TTL cache with lazy eviction.
//!
//! [`ExpiringCache`] keeps at most one value per key and evicts entries
//! whose TTL window has elapsed without use. Eviction is lazy: every
//! access sweeps expired entries first, so a freshly-expired entry is
//! never handed out. Accessing an entry prolongs it (resets its TTL
//! window); mere presence does not.

mod loaders;

pub use loaders::LoaderCache;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A cached value with its sliding TTL window.
#[derive(Debug, Clone)]
struct ExpiringEntry<V> {
    value: V,
    last_used: Instant,
    ttl: Duration,
}

impl<V> ExpiringEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            last_used: Instant::now(),
            ttl,
        }
    }

    /// Resets the TTL window.
    fn prolong(&mut self) {
        self.last_used = Instant::now();
    }

    fn is_expired(&self) -> bool {
        self.last_used.elapsed() >= self.ttl
    }
}

/// Generic sliding-TTL cache with identity lookup and prolong-on-use.
///
/// Values must be cheap to clone; callers typically store `Arc`s.
pub struct ExpiringCache<K, V> {
    entries: Mutex<HashMap<K, ExpiringEntry<V>>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> ExpiringCache<K, V> {
    /// Creates a cache whose entries expire `ttl` after their last use.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached value for `key`, creating it via `factory` if
    /// absent.
    ///
    /// Expired entries are swept before the lookup, so the factory runs
    /// again for a key whose previous value sat unused past the TTL. A
    /// surviving entry is prolonged before being returned.
    pub fn get_or_insert(&self, key: K, factory: impl FnOnce() -> V) -> V {
        let mut entries = self.entries.lock();
        Self::sweep_locked(&mut entries);
        let entry = entries
            .entry(key)
            .and_modify(ExpiringEntry::prolong)
            .or_insert_with(|| ExpiringEntry::new(factory(), self.ttl));
        entry.value.clone()
    }

    /// Returns the cached value for `key` if present and not expired,
    /// prolonging it.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock();
        Self::sweep_locked(&mut entries);
        entries.get_mut(key).map(|entry| {
            entry.prolong();
            entry.value.clone()
        })
    }

    /// Returns whether `key` is present after sweeping expired entries.
    ///
    /// Does not prolong the entry.
    pub fn contains(&self, key: &K) -> bool {
        let mut entries = self.entries.lock();
        Self::sweep_locked(&mut entries);
        entries.contains_key(key)
    }

    /// Removes all expired entries.
    pub fn sweep(&self) {
        Self::sweep_locked(&mut self.entries.lock());
    }

    /// Removes the entry for `key`, returning its value if present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries.lock().remove(key).map(|entry| entry.value)
    }

    /// Returns the raw entry count, including not-yet-swept entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn sweep_locked(entries: &mut HashMap<K, ExpiringEntry<V>>) {
        entries.retain(|_, entry| !entry.is_expired());
    }
}
