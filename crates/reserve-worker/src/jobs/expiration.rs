//! Pool expiration job: releases stale pooled reserves of one user.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use reserve_cache::PoolRegistry;
use reserve_core::config::AllocatorConfig;
use reserve_core::result::AppResult;
use reserve_core::traits::LedgerClient;
use reserve_core::types::UserId;

use crate::supervisor::{TaskContext, TaskKey, TaskSupervisor};

/// Result of one sweep over a user's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Entries released and removed.
    pub evicted: usize,
    /// Entries left in the pool.
    pub remaining: usize,
}

/// Sweeps a user's pool once per reserve lifetime.
#[derive(Debug, Clone)]
pub struct PoolExpirationJob {
    /// Per-user pools.
    registry: Arc<PoolRegistry>,
    /// Ledger receiving the releases.
    ledger: Arc<dyn LedgerClient>,
    /// Maximum age of a pooled entry.
    lifetime: Duration,
}

impl PoolExpirationJob {
    /// Create the job from the allocator settings.
    pub fn new(
        registry: Arc<PoolRegistry>,
        ledger: Arc<dyn LedgerClient>,
        config: &AllocatorConfig,
    ) -> Self {
        Self {
            registry,
            ledger,
            lifetime: config.reserve_lifetime(),
        }
    }

    /// Start the expiration task for `user_id` unless one is already running.
    pub fn spawn_for(&self, supervisor: &TaskSupervisor, user_id: UserId) -> bool {
        let job = self.clone();
        supervisor.spawn(TaskKey::pool_expiration(user_id), move |ctx| {
            job.run(user_id, ctx)
        })
    }

    /// Sweep loop. Ends once the pool is empty, on shutdown, or when a
    /// release fails.
    pub async fn run(self, user_id: UserId, mut ctx: TaskContext) -> AppResult<()> {
        loop {
            if !ctx.sleep(self.lifetime).await {
                tracing::debug!(user_id, "Pool expiration interrupted by shutdown");
                return Ok(());
            }

            let outcome = self.sweep(user_id, &ctx).await?;
            if outcome.evicted > 0 {
                tracing::debug!(
                    user_id,
                    evicted = outcome.evicted,
                    remaining = outcome.remaining,
                    "Expired pooled reserves released"
                );
            }

            if outcome.remaining == 0 {
                return Ok(());
            }
        }
    }

    /// Release and remove every entry older than the lifetime, under the
    /// user's pool lock. Deregisters the task when the pool ends up empty.
    ///
    /// A failed release stops the sweep; entries not yet released stay
    /// pooled.
    pub async fn sweep(&self, user_id: UserId, ctx: &TaskContext) -> AppResult<SweepOutcome> {
        let ledger = Arc::clone(&self.ledger);
        let lifetime = self.lifetime;

        self.registry
            .transact(user_id, |mut pool| async move {
                let mut evicted = 0;

                for key in pool.expired(Instant::now(), lifetime) {
                    let Some(reserve_id) = pool.get(&key).map(|r| r.id) else {
                        continue;
                    };

                    if let Err(e) = ledger.release(reserve_id).await {
                        tracing::error!(
                            user_id,
                            reserve_id,
                            error = %e,
                            "Failed to release expired reserve"
                        );
                        return (pool, Err(e));
                    }
                    pool.remove(&key);
                    evicted += 1;
                }

                if pool.is_empty() {
                    ctx.release();
                }

                let remaining = pool.len();
                (pool, Ok(SweepOutcome { evicted, remaining }))
            })
            .await
    }
}
