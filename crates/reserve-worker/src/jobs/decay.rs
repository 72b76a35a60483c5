//! Heat decay job: cools one user's heat counter down to zero.

use std::sync::Arc;
use std::time::Duration;

use reserve_cache::HeatMap;
use reserve_core::config::ConcurrencyConfig;
use reserve_core::result::AppResult;
use reserve_core::types::UserId;

use crate::supervisor::{TaskContext, TaskKey, TaskSupervisor};

/// Periodically subtracts the decay step from a user's heat level.
#[derive(Debug, Clone)]
pub struct HeatDecayJob {
    /// Heat counters.
    heat: Arc<HeatMap>,
    /// Time between two decay steps.
    interval: Duration,
    /// Amount removed per step.
    step: u64,
}

impl HeatDecayJob {
    /// Create the job from the concurrency settings.
    pub fn new(heat: Arc<HeatMap>, config: &ConcurrencyConfig) -> Self {
        Self {
            heat,
            interval: config.decay_interval(),
            step: config.decay,
        }
    }

    /// Start the decay task for `user_id` unless one is already running.
    pub fn spawn_for(&self, supervisor: &TaskSupervisor, user_id: UserId) -> bool {
        let job = self.clone();
        supervisor.spawn(TaskKey::heat_decay(user_id), move |ctx| job.run(user_id, ctx))
    }

    /// Decay loop. Ends once the level is drained or on shutdown.
    ///
    /// The task deregisters under the heat lock at the moment the level hits
    /// zero, so an increase racing with the final step starts a fresh task.
    pub async fn run(self, user_id: UserId, mut ctx: TaskContext) -> AppResult<()> {
        loop {
            if !ctx.sleep(self.interval).await {
                tracing::debug!(user_id, "Heat decay interrupted by shutdown");
                return Ok(());
            }

            let level = self
                .heat
                .decay(user_id, self.step, || ctx.release())
                .await;
            tracing::trace!(user_id, level, "Heat decayed");

            if level == 0 {
                tracing::debug!(user_id, "Heat drained");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::watch;

    fn config(heat: u64) -> ConcurrencyConfig {
        ConcurrencyConfig {
            decay_interval_ms: 100,
            decay: 1,
            heat,
            concurrent_threshold: 10,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_decays_one_step_per_interval() {
        let (_tx, rx) = watch::channel(false);
        let supervisor = TaskSupervisor::new(rx);
        let heat = Arc::new(HeatMap::new());
        heat.increase(1, 3).await;

        let job = HeatDecayJob::new(Arc::clone(&heat), &config(3));
        assert!(job.spawn_for(&supervisor, 1));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(heat.level(1).await.expect("still hot"), 2);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(heat.level(1).await.expect("still hot"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drained_level_removes_entry_and_task() {
        let (_tx, rx) = watch::channel(false);
        let supervisor = TaskSupervisor::new(rx);
        let heat = Arc::new(HeatMap::new());
        heat.increase(1, 2).await;

        let job = HeatDecayJob::new(Arc::clone(&heat), &config(2));
        job.spawn_for(&supervisor, 1);

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert!(heat.level(1).await.is_err());
        assert!(!supervisor.is_running(TaskKey::heat_decay(1)));
        assert!(supervisor.drain(Duration::from_secs(1)).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_spawn_while_running_is_ignored() {
        let (_tx, rx) = watch::channel(false);
        let supervisor = TaskSupervisor::new(rx);
        let heat = Arc::new(HeatMap::new());
        heat.increase(7, 20).await;

        let job = HeatDecayJob::new(Arc::clone(&heat), &config(10));
        assert!(job.spawn_for(&supervisor, 7));
        assert!(!job.spawn_for(&supervisor, 7));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(heat.level(7).await.expect("hot"), 19);
    }
}
