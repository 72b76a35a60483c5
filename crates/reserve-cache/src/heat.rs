//! Per-user heat counters.

use reserve_core::error::AppError;
use reserve_core::result::AppResult;
use reserve_core::types::UserId;

use crate::keyed::KeyedStore;

/// Decaying per-user counter approximating recent completed-request volume.
///
/// A counter is created by its first increase and removed by the decay that
/// brings it to zero, so a missing key and a cold user are the same thing.
#[derive(Debug, Default)]
pub struct HeatMap {
    levels: KeyedStore<UserId, u64>,
}

impl HeatMap {
    /// Create an empty heat map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` under the user's lock and return the updated level.
    pub async fn increase(&self, user_id: UserId, delta: u64) -> u64 {
        self.levels
            .transact(user_id, |level| async move {
                let next = level.saturating_add(delta);
                (next, next)
            })
            .await
    }

    /// Subtract `step` under the user's lock and return the updated level.
    ///
    /// When the level would reach zero or below it is clamped to zero, the
    /// entry is removed, and `on_drained` runs while the lock is still held.
    pub async fn decay<F>(&self, user_id: UserId, step: u64, on_drained: F) -> u64
    where
        F: FnOnce(),
    {
        self.levels
            .transact(user_id, |level| async move {
                let next = level.saturating_sub(step);
                if next == 0 {
                    on_drained();
                }
                (next, next)
            })
            .await
    }

    /// Current level of the user. Fails with `NotFound` for a cold user.
    pub async fn level(&self, user_id: UserId) -> AppResult<u64> {
        self.levels
            .load(&user_id)
            .await
            .ok_or_else(|| AppError::not_found(format!("no heat entry for user {user_id}")))
    }

    /// Number of users with a live counter.
    pub fn tracked_users(&self) -> usize {
        self.levels.len()
    }
}
