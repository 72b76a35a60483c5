//! In-memory system of record.
//!
//! Amounts are stored in major units, exactly as received; scaling to and
//! from minor units is the client's job.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use chrono::Utc;

use reserve_core::config::LedgerConfig;
use reserve_core::error::AppError;
use reserve_core::result::AppResult;
use reserve_core::types::{
    Reserve, ReserveId, ReserveRequest, ReserveStatus, ReserveVersion, UserId,
};

/// Simulated ledger storage.
#[derive(Debug)]
pub struct MemoryLedger {
    /// Every reserve ever created, released ones included.
    reserves: Mutex<HashMap<ReserveId, Reserve>>,
    /// Next identifier to hand out.
    next_id: AtomicI64,
    /// Latency added to every post.
    post_delay: Duration,
    /// Latency added to every split.
    split_delay: Duration,
}

impl MemoryLedger {
    /// Create an empty ledger with the configured latencies.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            reserves: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            post_delay: config.post_delay(),
            split_delay: config.split_delay(),
        }
    }

    fn allocate_id(&self) -> ReserveId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Create a reserve for `request.amount`, tagged `initial_tbs`.
    pub async fn insert(&self, request: &ReserveRequest) -> AppResult<Reserve> {
        simulate_latency(self.post_delay).await;

        if request.amount <= 0 {
            return Err(AppError::ledger(format!(
                "cannot hold a non-positive amount ({})",
                request.amount
            )));
        }

        let now = Utc::now();
        let reserve = Reserve {
            id: self.allocate_id(),
            version: Some(ReserveVersion::InitialTbs),
            external_reference: request.external_reference.clone(),
            idempotency_key: request.idempotency_key.clone(),
            reason: request.reason,
            mode: request.mode,
            amount: request.amount,
            client_id: request.client_id.clone(),
            user_id: request.user_id,
            status: ReserveStatus::Reserved,
            date_created: now,
            last_modified: now,
        };

        let mut reserves = self.reserves.lock().unwrap_or_else(|e| e.into_inner());
        reserves.insert(reserve.id, reserve.clone());

        tracing::debug!(
            reserve_id = reserve.id,
            user_id = reserve.user_id,
            amount = reserve.amount,
            "Ledger reserve posted"
        );
        Ok(reserve)
    }

    /// Release `parent_id` and replace it with a remainder and a child of
    /// `request.amount`. Returns `(remainder, child)`.
    pub async fn split(
        &self,
        request: &ReserveRequest,
        parent_id: ReserveId,
    ) -> AppResult<(Reserve, Reserve)> {
        simulate_latency(self.split_delay).await;

        if request.amount <= 0 {
            return Err(AppError::ledger(format!(
                "cannot split off a non-positive amount ({})",
                request.amount
            )));
        }

        let mut reserves = self.reserves.lock().unwrap_or_else(|e| e.into_inner());

        let parent = match reserves.get(&parent_id) {
            Some(parent) if parent.is_reserved() => parent.clone(),
            _ => {
                return Err(AppError::not_found(format!(
                    "no held reserve {parent_id} to split"
                )));
            }
        };

        if parent.amount <= request.amount {
            return Err(AppError::insufficient_amount(format!(
                "reserve {parent_id} holds {} which cannot cover {}",
                parent.amount, request.amount
            )));
        }

        let now = Utc::now();

        let remainder = Reserve {
            id: self.allocate_id(),
            version: Some(ReserveVersion::SplittedRest),
            amount: parent.amount - request.amount,
            status: ReserveStatus::Reserved,
            date_created: now,
            last_modified: now,
            ..parent.clone()
        };

        let child = Reserve {
            id: self.allocate_id(),
            version: Some(ReserveVersion::Splitted),
            external_reference: request.external_reference.clone(),
            idempotency_key: request.idempotency_key.clone(),
            reason: request.reason,
            mode: request.mode,
            amount: request.amount,
            client_id: request.client_id.clone(),
            user_id: request.user_id,
            status: ReserveStatus::Reserved,
            date_created: now,
            last_modified: now,
        };

        if let Some(stored) = reserves.get_mut(&parent_id) {
            stored.status = ReserveStatus::Released;
            stored.last_modified = now;
        }
        reserves.insert(remainder.id, remainder.clone());
        reserves.insert(child.id, child.clone());

        tracing::debug!(
            parent_id,
            remainder_id = remainder.id,
            child_id = child.id,
            remainder_amount = remainder.amount,
            child_amount = child.amount,
            "Ledger reserve split"
        );
        Ok((remainder, child))
    }

    /// Mark a reserve released. Unknown and already released ids are ignored.
    pub fn release(&self, reserve_id: ReserveId) {
        let mut reserves = self.reserves.lock().unwrap_or_else(|e| e.into_inner());

        match reserves.get_mut(&reserve_id) {
            Some(reserve) if reserve.is_reserved() => {
                reserve.status = ReserveStatus::Released;
                reserve.last_modified = Utc::now();
                tracing::debug!(reserve_id, "Ledger reserve released");
            }
            Some(_) => {
                tracing::trace!(reserve_id, "Ledger reserve already released");
            }
            None => {
                tracing::warn!(reserve_id, "Release requested for unknown reserve");
            }
        }
    }

    /// Every reserve of the user, ordered by id.
    pub fn list(&self, user_id: UserId) -> Vec<Reserve> {
        let reserves = self.reserves.lock().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<Reserve> = reserves
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by_key(|r| r.id);
        owned
    }

    /// Look a reserve up by id.
    pub fn get(&self, reserve_id: ReserveId) -> Option<Reserve> {
        let reserves = self.reserves.lock().unwrap_or_else(|e| e.into_inner());
        reserves.get(&reserve_id).cloned()
    }
}

async fn simulate_latency(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
