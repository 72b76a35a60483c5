//! Per-user pool of pooled reserves.
//!
//! Entries are keyed by allocation instant; iteration for allocation goes by
//! descending amount so the engine always evaluates the largest candidate
//! first.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Duration;

use tokio::time::Instant;

use reserve_core::types::Reserve;

use crate::keyed::Vacant;

static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Allocation timestamp of a pooled entry. The sequence number keeps keys
/// unique when two entries land on the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolKey {
    allocated_at: Instant,
    sequence: u64,
}

impl PoolKey {
    /// Key for an entry allocated now.
    pub fn now() -> Self {
        Self {
            allocated_at: Instant::now(),
            sequence: NEXT_SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed),
        }
    }

    /// Whether the entry has outlived `lifetime` at `now`.
    pub fn is_expired(&self, now: Instant, lifetime: Duration) -> bool {
        now > self.allocated_at + lifetime
    }
}

/// Largest amount first; on equal amounts the older entry wins.
fn by_amount_desc(a: &(PoolKey, &Reserve), b: &(PoolKey, &Reserve)) -> Ordering {
    b.1.amount.cmp(&a.1.amount).then_with(|| a.0.cmp(&b.0))
}

/// Ordered collection of pooled reserves for one user.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    entries: BTreeMap<PoolKey, Reserve>,
}

impl Pool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pooled entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the pool holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a reserve under `key`.
    pub fn insert(&mut self, key: PoolKey, reserve: Reserve) {
        self.entries.insert(key, reserve);
    }

    /// Insert a reserve keyed by the current instant.
    pub fn insert_now(&mut self, reserve: Reserve) -> PoolKey {
        let key = PoolKey::now();
        self.insert(key, reserve);
        key
    }

    /// Remove the entry under `key`.
    pub fn remove(&mut self, key: &PoolKey) -> Option<Reserve> {
        self.entries.remove(key)
    }

    /// Entry under `key`.
    pub fn get(&self, key: &PoolKey) -> Option<&Reserve> {
        self.entries.get(key)
    }

    /// Entries by descending amount.
    pub fn by_amount(&self) -> impl Iterator<Item = (PoolKey, &Reserve)> {
        let mut ordered: Vec<(PoolKey, &Reserve)> =
            self.entries.iter().map(|(k, r)| (*k, r)).collect();
        ordered.sort_by(by_amount_desc);
        ordered.into_iter()
    }

    /// The largest entry, if any.
    pub fn largest(&self) -> Option<(PoolKey, &Reserve)> {
        self.entries
            .iter()
            .map(|(k, r)| (*k, r))
            .min_by(by_amount_desc)
    }

    /// Keys of every entry older than `lifetime` at `now`, oldest first.
    pub fn expired(&self, now: Instant, lifetime: Duration) -> Vec<PoolKey> {
        self.entries
            .keys()
            .filter(|key| key.is_expired(now, lifetime))
            .copied()
            .collect()
    }

    /// Pooled reserves by descending amount.
    pub fn reserves(&self) -> Vec<Reserve> {
        self.by_amount().map(|(_, r)| r.clone()).collect()
    }

    /// Sum of all pooled amounts, in minor units. Saturates instead of
    /// overflowing.
    pub fn total_amount(&self) -> i64 {
        self.entries
            .values()
            .fold(0i64, |total, r| total.saturating_add(r.amount))
    }
}

impl Vacant for Pool {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use reserve_core::types::{Mode, Reason, ReserveStatus, ReserveVersion};

    pub(crate) fn reserve(id: i64, amount: i64) -> Reserve {
        let now = Utc::now();
        Reserve {
            id,
            version: Some(ReserveVersion::InitialTbs),
            external_reference: "ext".to_string(),
            idempotency_key: "idem".to_string(),
            reason: Reason::ReserveForPayment,
            mode: Mode::Total,
            amount,
            client_id: "client".to_string(),
            user_id: 1,
            status: ReserveStatus::Reserved,
            date_created: now,
            last_modified: now,
        }
    }

    #[tokio::test]
    async fn test_by_amount_is_descending() {
        let mut pool = Pool::new();
        pool.insert_now(reserve(1, 1_000));
        pool.insert_now(reserve(2, 25_000));
        pool.insert_now(reserve(3, 5_000));

        let amounts: Vec<i64> = pool.by_amount().map(|(_, r)| r.amount).collect();
        assert_eq!(amounts, vec![25_000, 5_000, 1_000]);
        assert_eq!(pool.largest().map(|(_, r)| r.id), Some(2));
    }

    #[tokio::test]
    async fn test_equal_amounts_prefer_older_entry() {
        let mut pool = Pool::new();
        let first = pool.insert_now(reserve(1, 500));
        pool.insert_now(reserve(2, 500));

        let (key, largest) = pool.largest().expect("non-empty");
        assert_eq!(key, first);
        assert_eq!(largest.id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_respects_lifetime() {
        let lifetime = Duration::from_secs(2);
        let mut pool = Pool::new();
        let old = pool.insert_now(reserve(1, 100));

        tokio::time::advance(Duration::from_secs(3)).await;
        let fresh = pool.insert_now(reserve(2, 100));

        let expired = pool.expired(Instant::now(), lifetime);
        assert_eq!(expired, vec![old]);
        assert!(!fresh.is_expired(Instant::now(), lifetime));
    }

    #[tokio::test]
    async fn test_remove_and_totals() {
        let mut pool = Pool::new();
        let key = pool.insert_now(reserve(1, 100));
        pool.insert_now(reserve(2, 300));
        assert_eq!(pool.total_amount(), 400);

        assert_eq!(pool.remove(&key).map(|r| r.id), Some(1));
        assert_eq!(pool.len(), 1);
        assert!(!pool.is_vacant());
    }

    #[tokio::test]
    async fn test_total_amount_saturates() {
        let mut pool = Pool::new();
        pool.insert_now(reserve(1, i64::MAX));
        pool.insert_now(reserve(2, 1));
        assert_eq!(pool.total_amount(), i64::MAX);
    }
}
