//! Application builder: wires state, router and middleware into an Axum app.

use std::sync::Arc;

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use reserve_core::config::AppConfig;
use reserve_core::traits::LedgerClient;
use reserve_ledger::SimulatedLedgerClient;
use reserve_service::ReserveService;
use reserve_worker::TaskSupervisor;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared state over the simulated ledger.
///
/// Background tasks observe `shutdown` and stop at their next sleep once it
/// flips to `true`.
pub fn build_state(config: AppConfig, shutdown: watch::Receiver<bool>) -> AppState {
    let ledger: Arc<dyn LedgerClient> = Arc::new(SimulatedLedgerClient::new(&config.ledger));
    build_state_with_ledger(config, ledger, shutdown)
}

/// Builds the shared state over any ledger client.
pub fn build_state_with_ledger(
    config: AppConfig,
    ledger: Arc<dyn LedgerClient>,
    shutdown: watch::Receiver<bool>,
) -> AppState {
    let supervisor = Arc::new(TaskSupervisor::new(shutdown));
    let reserve_service = Arc::new(ReserveService::from_config(
        &config,
        ledger,
        Arc::clone(&supervisor),
    ));

    AppState {
        config: Arc::new(config),
        reserve_service,
        supervisor,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state).layer(TraceLayer::new_for_http())
}
