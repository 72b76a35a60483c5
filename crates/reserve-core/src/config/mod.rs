//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a default so an empty file is valid.

pub mod allocator;
pub mod app;
pub mod concurrency;
pub mod ledger;
pub mod logging;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::allocator::AllocatorConfig;
pub use self::app::ServerConfig;
pub use self::concurrency::ConcurrencyConfig;
pub use self::ledger::LedgerConfig;
pub use self::logging::LoggingConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `RESERVE__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Pooled allocation settings.
    #[serde(default)]
    pub allocator: AllocatorConfig,
    /// Heat tracking settings.
    #[serde(default)]
    pub concurrency: ConcurrencyConfig,
    /// Simulated ledger settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Background task settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with an environment-specific overlay and
    /// environment variables prefixed with `RESERVE`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("RESERVE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject values the allocation engine cannot work with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.allocator.max_retry_allocation == 0 {
            return Err(AppError::configuration(
                "allocator.max_retry_allocation must be at least 1",
            ));
        }
        if self.allocator.overshoot_factor < 1 {
            return Err(AppError::configuration(
                "allocator.overshoot_factor must be at least 1",
            ));
        }
        if self.concurrency.heat == 0 {
            return Err(AppError::configuration("concurrency.heat must be positive"));
        }
        if self.concurrency.decay == 0 {
            return Err(AppError::configuration(
                "concurrency.decay must be positive",
            ));
        }
        if self.ledger.post_failure_percent > 100 || self.ledger.split_failure_percent > 100 {
            return Err(AppError::configuration(
                "ledger failure percentages must be within 0..=100",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_tuning() {
        let config = AppConfig::default();
        assert_eq!(config.allocator.max_retry_allocation, 5);
        assert_eq!(config.allocator.overshoot_factor, 10);
        assert_eq!(config.allocator.reserve_lifetime_ms, 2_000);
        assert_eq!(config.concurrency.decay_interval_ms, 100_000);
        assert_eq!(config.concurrency.decay, 1);
        assert_eq!(config.concurrency.heat, 10);
        assert_eq!(config.concurrency.concurrent_threshold, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_retries() {
        let mut config = AppConfig::default();
        config.allocator.max_retry_allocation = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[allocator]\novershoot_factor = 4\n",
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("partial config should deserialize");

        assert_eq!(parsed.allocator.overshoot_factor, 4);
        assert_eq!(parsed.allocator.max_retry_allocation, 5);
        assert_eq!(parsed.server.port, 8080);
    }
}
