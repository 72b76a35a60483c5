//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use reserve_core::config::AppConfig;
use reserve_service::ReserveService;
use reserve_worker::TaskSupervisor;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Reservation use cases
    pub reserve_service: Arc<ReserveService>,
    /// Supervisor of the per-user background tasks
    pub supervisor: Arc<TaskSupervisor>,
}
