//! Reservation pool registry.
//!
//! Holds one [`Pool`] per user inside a [`KeyedStore`]. Every mutation of a
//! user's pool, including the ledger round-trips performed while deciding
//! on it, runs under that user's exclusive lock. Different users never
//! contend.

use std::future::Future;

use reserve_core::types::{Reserve, UserId};

use crate::keyed::KeyedStore;
use crate::pool::Pool;

/// Per-user store of pooled reserves.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: KeyedStore<UserId, Pool>,
}

impl PoolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the user's pool under the user's exclusive lock and store
    /// the pool it returns. An empty result drops the pool and its lock.
    pub async fn transact<F, Fut, R>(&self, user_id: UserId, f: F) -> R
    where
        F: FnOnce(Pool) -> Fut,
        Fut: Future<Output = (Pool, R)>,
    {
        self.pools.transact(user_id, f).await
    }

    /// Snapshot of the user's pool, if the user has one.
    pub async fn load(&self, user_id: UserId) -> Option<Pool> {
        self.pools.load(&user_id).await
    }

    /// Pooled reserves of the user by descending amount.
    pub async fn list(&self, user_id: UserId) -> Vec<Reserve> {
        self.load(user_id)
            .await
            .map(|pool| pool.reserves())
            .unwrap_or_default()
    }

    /// Whether the user currently has a pool entry.
    pub fn is_loaded(&self, user_id: UserId) -> bool {
        self.pools.contains(&user_id)
    }

    /// Number of users holding a pool.
    pub fn user_count(&self) -> usize {
        self.pools.len()
    }
}
