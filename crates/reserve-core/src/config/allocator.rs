//! Pooled allocation configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the pooled allocation path and its expiration sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Maximum post-and-split attempts for one pooled allocation.
    #[serde(default = "default_max_retry")]
    pub max_retry_allocation: u32,
    /// Multiplier applied to the requested amount when posting a pooled reserve.
    #[serde(default = "default_overshoot")]
    pub overshoot_factor: i64,
    /// Lifetime of a pooled entry in milliseconds; also the sweep period.
    #[serde(default = "default_lifetime")]
    pub reserve_lifetime_ms: u64,
}

impl AllocatorConfig {
    /// Pooled entry lifetime as a [`Duration`].
    pub fn reserve_lifetime(&self) -> Duration {
        Duration::from_millis(self.reserve_lifetime_ms)
    }
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_retry_allocation: default_max_retry(),
            overshoot_factor: default_overshoot(),
            reserve_lifetime_ms: default_lifetime(),
        }
    }
}

fn default_max_retry() -> u32 {
    5
}

fn default_overshoot() -> i64 {
    10
}

fn default_lifetime() -> u64 {
    2_000
}
