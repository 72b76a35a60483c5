//! Allocation engine: produces one reserve for one request.
//!
//! Non-concurrent users get a reserve posted straight to the ledger.
//! Concurrent users are served by splitting request-sized pieces off an
//! oversized pooled reserve, so the ledger sees one post per pool refill
//! instead of one per request. All pool work for a user, ledger calls
//! included, runs inside a single registry transaction.

use std::sync::Arc;

use reserve_cache::{Pool, PoolKey, PoolRegistry};
use reserve_core::config::AllocatorConfig;
use reserve_core::error::AppError;
use reserve_core::result::AppResult;
use reserve_core::traits::LedgerClient;
use reserve_core::types::{Reserve, ReserveId, ReserveRequest, ReserveVersion, UserId};
use reserve_worker::{PoolExpirationJob, TaskSupervisor};

/// Allocation engine over the pool registry and the ledger.
#[derive(Debug, Clone)]
pub struct AllocationService {
    /// Per-user pools.
    registry: Arc<PoolRegistry>,
    /// System of record.
    ledger: Arc<dyn LedgerClient>,
    /// Runs the expiration tasks.
    supervisor: Arc<TaskSupervisor>,
    /// Expiration job template.
    expiration: PoolExpirationJob,
    /// Pool refill size as a multiple of the requested amount.
    overshoot_factor: i64,
    /// Attempts per pooled allocation.
    max_retry_allocation: u32,
}

impl AllocationService {
    /// Creates a new allocation service.
    pub fn new(
        registry: Arc<PoolRegistry>,
        ledger: Arc<dyn LedgerClient>,
        supervisor: Arc<TaskSupervisor>,
        config: &AllocatorConfig,
    ) -> Self {
        Self {
            expiration: PoolExpirationJob::new(
                Arc::clone(&registry),
                Arc::clone(&ledger),
                config,
            ),
            registry,
            ledger,
            supervisor,
            overshoot_factor: config.overshoot_factor,
            max_retry_allocation: config.max_retry_allocation,
        }
    }

    /// Allocate a reserve for `request`, pooled when `concurrent`.
    pub async fn allocate(&self, request: &ReserveRequest, concurrent: bool) -> AppResult<Reserve> {
        if concurrent {
            self.allocate_pooled(request).await
        } else {
            self.allocate_direct(request).await
        }
    }

    /// One ledger post for exactly the requested amount.
    async fn allocate_direct(&self, request: &ReserveRequest) -> AppResult<Reserve> {
        let reserve = self.ledger.post(request, 1).await?;
        tracing::debug!(
            user_id = request.user_id,
            reserve_id = reserve.id,
            amount = reserve.amount,
            "Direct reserve allocated"
        );
        Ok(reserve.tagged(ReserveVersion::Standalone))
    }

    /// Split the request off the user's pool under the pool lock.
    ///
    /// Whenever the pool is left non-empty the user's expiration task is
    /// ensured before the lock is released.
    async fn allocate_pooled(&self, request: &ReserveRequest) -> AppResult<Reserve> {
        let user_id = request.user_id;

        self.registry
            .transact(user_id, |mut pool| async move {
                let result = self.split_from_pool(&mut pool, request).await;

                if !pool.is_empty() && self.expiration.spawn_for(&self.supervisor, user_id) {
                    tracing::debug!(user_id, "Pool expiration started");
                }

                (pool, result)
            })
            .await
    }

    /// The bounded refill/split loop.
    ///
    /// Each attempt looks for a pooled reserve strictly larger than the
    /// request; when none exists it refills the pool once and looks again.
    async fn split_from_pool(&self, pool: &mut Pool, request: &ReserveRequest) -> AppResult<Reserve> {
        let user_id = request.user_id;
        let mut last_failure: Option<AppError> = None;

        for attempt in 1..=self.max_retry_allocation {
            let target = match split_target(pool, request) {
                Some(target) => target,
                None => {
                    let refill = self
                        .ledger
                        .post(request, self.overshoot_factor)
                        .await
                        .inspect_err(|e| {
                            tracing::error!(user_id, attempt, error = %e, "Pool refill failed");
                        })?;

                    tracing::debug!(
                        user_id,
                        attempt,
                        reserve_id = refill.id,
                        amount = refill.amount,
                        "Pool refilled"
                    );
                    pool.insert_now(refill.tagged(ReserveVersion::InitialTbs));

                    match split_target(pool, request) {
                        Some(target) => target,
                        None => {
                            tracing::debug!(
                                user_id,
                                attempt,
                                amount = request.amount,
                                "No pooled reserve fits"
                            );
                            continue;
                        }
                    }
                }
            };
            let (key, parent_id) = target;

            match self.ledger.split(request, parent_id).await {
                Ok((remainder, child)) => {
                    pool.remove(&key);
                    pool.insert_now(remainder);

                    tracing::debug!(
                        user_id,
                        attempt,
                        parent_id,
                        reserve_id = child.id,
                        pooled = pool.total_amount(),
                        "Pooled reserve allocated"
                    );
                    return Ok(child);
                }
                Err(e) => {
                    tracing::warn!(user_id, attempt, parent_id, error = %e, "Pooled split failed");

                    if e.is_not_found() {
                        pool.remove(&key);
                    }
                    last_failure = Some(e);
                }
            }
        }

        let cause = last_failure
            .map(|e| format!(": {}", e.message))
            .unwrap_or_default();
        tracing::warn!(
            user_id,
            attempts = self.max_retry_allocation,
            amount = request.amount,
            "Pooled allocation exhausted"
        );

        Err(AppError::allocation_exhausted(format!(
            "no pooled reserve could cover {} after {} attempts{}",
            request.amount, self.max_retry_allocation, cause
        )))
    }

    /// Every reserve the ledger holds for the user.
    pub async fn list_from_ledger(&self, user_id: UserId) -> AppResult<Vec<Reserve>> {
        self.ledger.list(user_id).await
    }

    /// The user's pooled reserves, largest first.
    pub async fn list_from_registry(&self, user_id: UserId) -> Vec<Reserve> {
        self.registry.list(user_id).await
    }
}

/// Largest pooled reserve if it is strictly larger than the request.
fn split_target(pool: &Pool, request: &ReserveRequest) -> Option<(PoolKey, ReserveId)> {
    pool.largest()
        .filter(|(_, candidate)| candidate.amount > request.amount)
        .map(|(key, candidate)| (key, candidate.id))
}
