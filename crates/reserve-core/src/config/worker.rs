//! Background task configuration.

use serde::{Deserialize, Serialize};

/// Settings for the per-user background task supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds to wait for background tasks after the shutdown signal.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

fn default_shutdown_grace() -> u64 {
    10
}
