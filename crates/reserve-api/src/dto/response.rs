//! Response DTOs.
//!
//! Reserves are returned as-is; their serialized form already exposes only
//! `id`, `version`, `amount` and `status`.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while the server answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Supervised background tasks currently registered.
    pub background_tasks: usize,
}
