//! Ledger client abstraction.
//!
//! The ledger is the system of record that creates, splits and releases
//! holds. The allocation engine and the expiration job only talk to it
//! through this trait, so a real ledger can replace the simulated one
//! without touching either.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::{Reserve, ReserveId, ReserveRequest, UserId};

/// Operations the core needs from the system of record.
#[async_trait]
pub trait LedgerClient: Send + Sync + std::fmt::Debug {
    /// Post a new reserve for `request.amount × size_factor`.
    async fn post(&self, request: &ReserveRequest, size_factor: i64) -> AppResult<Reserve>;

    /// Split `request.amount` off the reserve `parent_id`.
    ///
    /// Returns `(remainder, child)`. Fails with `NotFound` when the parent is
    /// unknown and `InsufficientAmount` when the parent is not strictly
    /// larger than the requested amount.
    async fn split(
        &self,
        request: &ReserveRequest,
        parent_id: ReserveId,
    ) -> AppResult<(Reserve, Reserve)>;

    /// Release a reserve. No-op when it is unknown or already released.
    async fn release(&self, reserve_id: ReserveId) -> AppResult<()>;

    /// List every reserve the ledger holds for a user.
    async fn list(&self, user_id: UserId) -> AppResult<Vec<Reserve>>;
}
