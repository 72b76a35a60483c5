//! Keyed-lock store.
//!
//! Maps each key to an owned value behind its own `RwLock`. Entries are
//! created on first access and dropped, lock included, as soon as a
//! transaction leaves the value vacant. Callers never see the lock: all
//! mutation goes through [`KeyedStore::transact`], all reads through
//! [`KeyedStore::load`].

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::trace;

/// Values that can tell when they hold nothing worth keeping.
pub trait Vacant {
    /// `true` when the entry owning this value should be removed.
    fn is_vacant(&self) -> bool;
}

impl Vacant for u64 {
    fn is_vacant(&self) -> bool {
        *self == 0
    }
}

/// Lock-protected cell. `retired` is set under the write lock right before
/// the cell is unlinked from the map, so late waiters know to start over.
#[derive(Debug, Default)]
struct Slot<V> {
    value: V,
    retired: bool,
}

/// Mapping from key to a lazily created, garbage-collected locked value.
#[derive(Debug)]
pub struct KeyedStore<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, Arc<RwLock<Slot<V>>>>,
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Default + Clone + Vacant,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Run `f` against a snapshot of the value for `key` while holding the
    /// key's exclusive lock for the whole call, including every await inside
    /// `f`. The value returned by `f` replaces the stored one; a vacant value
    /// removes the entry and its lock.
    ///
    /// If the future is dropped before completion the stored value is left
    /// untouched.
    pub async fn transact<F, Fut, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(V) -> Fut,
        Fut: Future<Output = (V, R)>,
    {
        loop {
            let slot = Arc::clone(
                self.entries
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(RwLock::new(Slot::default())))
                    .value(),
            );

            let mut guard = slot.write().await;
            if guard.retired {
                trace!(key = ?key, "Lock entry retired while waiting, retrying");
                continue;
            }

            let (next, result) = f(guard.value.clone()).await;

            if next.is_vacant() {
                guard.retired = true;
                guard.value = V::default();
                self.entries
                    .remove_if(&key, |_, current| Arc::ptr_eq(current, &slot));
                trace!(key = ?key, "Entry emptied, lock reclaimed");
            } else {
                guard.value = next;
            }

            return result;
        }
    }

    /// Snapshot of the value for `key` under the shared lock. Returns `None`
    /// when the key has no live entry.
    pub async fn load(&self, key: &K) -> Option<V> {
        let slot = Arc::clone(self.entries.get(key)?.value());
        let guard = slot.read().await;

        if guard.retired || guard.value.is_vacant() {
            return None;
        }
        Some(guard.value.clone())
    }

    /// Whether a lock entry currently exists for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys with a live lock entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has a live lock entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Default + Clone + Vacant,
{
    fn default() -> Self {
        Self::new()
    }
}
