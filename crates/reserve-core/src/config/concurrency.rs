//! Heat tracking configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controls how per-user heat accumulates and decays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    /// Milliseconds between two decay ticks.
    #[serde(default = "default_decay_interval")]
    pub decay_interval_ms: u64,
    /// Amount subtracted on every decay tick.
    #[serde(default = "default_decay")]
    pub decay: u64,
    /// Amount added for every completed request.
    #[serde(default = "default_heat")]
    pub heat: u64,
    /// A user is concurrent when its heat is strictly above this value.
    #[serde(default = "default_threshold")]
    pub concurrent_threshold: u64,
}

impl ConcurrencyConfig {
    /// Decay tick period as a [`Duration`].
    pub fn decay_interval(&self) -> Duration {
        Duration::from_millis(self.decay_interval_ms)
    }
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        Self {
            decay_interval_ms: default_decay_interval(),
            decay: default_decay(),
            heat: default_heat(),
            concurrent_threshold: default_threshold(),
        }
    }
}

fn default_decay_interval() -> u64 {
    100_000
}

fn default_decay() -> u64 {
    1
}

fn default_heat() -> u64 {
    10
}

fn default_threshold() -> u64 {
    10
}
