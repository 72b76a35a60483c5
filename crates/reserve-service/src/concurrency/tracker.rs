//! Heat tracker: decides whether a user's traffic is concurrent.

use std::sync::Arc;

use reserve_cache::HeatMap;
use reserve_core::config::ConcurrencyConfig;
use reserve_core::result::AppResult;
use reserve_core::types::UserId;
use reserve_worker::{HeatDecayJob, TaskSupervisor};

/// Classifies users as concurrent once their heat exceeds the threshold.
#[derive(Debug, Clone)]
pub struct HeatTracker {
    /// Per-user heat counters.
    heat: Arc<HeatMap>,
    /// Runs the decay tasks.
    supervisor: Arc<TaskSupervisor>,
    /// Decay job template.
    decay: HeatDecayJob,
    /// Heat added per completed request.
    step: u64,
    /// Level above which a user is concurrent.
    threshold: u64,
}

impl HeatTracker {
    /// Creates a new heat tracker.
    pub fn new(
        heat: Arc<HeatMap>,
        supervisor: Arc<TaskSupervisor>,
        config: &ConcurrencyConfig,
    ) -> Self {
        Self {
            decay: HeatDecayJob::new(Arc::clone(&heat), config),
            heat,
            supervisor,
            step: config.heat,
            threshold: config.concurrent_threshold,
        }
    }

    /// Adds `delta` to the user's heat and returns the new level.
    ///
    /// A cold user becoming warm (new level equal to one step) gets a decay
    /// task. The supervisor ignores the spawn if one is already running.
    pub async fn increase(&self, user_id: UserId, delta: u64) -> u64 {
        let level = self.heat.increase(user_id, delta).await;

        if level == self.step && self.decay.spawn_for(&self.supervisor, user_id) {
            tracing::debug!(user_id, level, "Heat decay started");
        }

        level
    }

    /// Records one completed request for the user.
    pub async fn record_completion(&self, user_id: UserId) -> u64 {
        self.increase(user_id, self.step).await
    }

    /// Whether the user's traffic is currently concurrent.
    pub async fn check(&self, user_id: UserId) -> bool {
        match self.heat.level(user_id).await {
            Ok(level) => level > self.threshold,
            Err(e) if e.is_not_found() => false,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Heat lookup failed");
                false
            }
        }
    }

    /// Current heat level. Fails with `NotFound` for a cold user.
    pub async fn level(&self, user_id: UserId) -> AppResult<u64> {
        self.heat.level(user_id).await
    }
}
