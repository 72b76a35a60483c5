//! Simulated ledger configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Latency and failure injection for the in-memory ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Simulated latency of a post call, in milliseconds.
    #[serde(default = "default_post_delay")]
    pub post_delay_ms: u64,
    /// Simulated latency of a split call, in milliseconds.
    #[serde(default = "default_split_delay")]
    pub split_delay_ms: u64,
    /// Percentage (0-100) of post calls that fail.
    #[serde(default)]
    pub post_failure_percent: u8,
    /// Percentage (0-100) of split calls that fail.
    #[serde(default)]
    pub split_failure_percent: u8,
}

impl LedgerConfig {
    /// A ledger without latency or failures.
    pub fn instant() -> Self {
        Self {
            post_delay_ms: 0,
            split_delay_ms: 0,
            post_failure_percent: 0,
            split_failure_percent: 0,
        }
    }

    /// Post latency as a [`Duration`].
    pub fn post_delay(&self) -> Duration {
        Duration::from_millis(self.post_delay_ms)
    }

    /// Split latency as a [`Duration`].
    pub fn split_delay(&self) -> Duration {
        Duration::from_millis(self.split_delay_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            post_delay_ms: default_post_delay(),
            split_delay_ms: default_split_delay(),
            post_failure_percent: 0,
            split_failure_percent: 0,
        }
    }
}

fn default_post_delay() -> u64 {
    70
}

fn default_split_delay() -> u64 {
    35
}
