//! Reservation request passed from the HTTP layer to the allocation engine.

use serde::{Deserialize, Serialize};

use super::reserve::{Mode, Reason, UserId};

/// Desired reserve, as validated by the HTTP layer. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveRequest {
    /// Requested amount in minor units.
    pub amount: i64,
    /// How the reserve is captured.
    pub mode: Mode,
    /// Why the funds are held.
    pub reason: Reason,
    /// Caller-supplied reference.
    pub external_reference: String,
    /// Caller-supplied idempotency key.
    pub idempotency_key: String,
    /// Requesting client.
    pub client_id: String,
    /// Owner of the reserve.
    pub user_id: UserId,
}

impl ReserveRequest {
    /// Copy of this request asking for another amount.
    pub fn with_amount(&self, amount: i64) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}
