//! Reservation use cases exposed to the HTTP layer.

use std::sync::Arc;

use reserve_cache::{HeatMap, PoolRegistry};
use reserve_core::config::AppConfig;
use reserve_core::result::AppResult;
use reserve_core::traits::LedgerClient;
use reserve_core::types::{Reserve, ReserveRequest, UserId};
use reserve_worker::TaskSupervisor;

use crate::allocator::AllocationService;
use crate::concurrency::HeatTracker;

/// Facade combining concurrency classification and allocation.
#[derive(Debug, Clone)]
pub struct ReserveService {
    /// Heat tracker.
    tracker: Arc<HeatTracker>,
    /// Allocation engine.
    allocator: Arc<AllocationService>,
}

impl ReserveService {
    /// Creates a new reserve service.
    pub fn new(tracker: Arc<HeatTracker>, allocator: Arc<AllocationService>) -> Self {
        Self { tracker, allocator }
    }

    /// Wires a tracker and an allocation engine with fresh in-memory state.
    pub fn from_config(
        config: &AppConfig,
        ledger: Arc<dyn LedgerClient>,
        supervisor: Arc<TaskSupervisor>,
    ) -> Self {
        let tracker = HeatTracker::new(
            Arc::new(HeatMap::new()),
            Arc::clone(&supervisor),
            &config.concurrency,
        );
        let allocator = AllocationService::new(
            Arc::new(PoolRegistry::new()),
            ledger,
            supervisor,
            &config.allocator,
        );
        Self::new(Arc::new(tracker), Arc::new(allocator))
    }

    /// Allocates a reserve for the request.
    ///
    /// The user is classified from completions recorded before this call;
    /// this request's own completion is recorded afterwards by the caller.
    pub async fn reserve(&self, request: ReserveRequest) -> AppResult<Reserve> {
        let concurrent = self.tracker.check(request.user_id).await;
        tracing::debug!(
            user_id = request.user_id,
            amount = request.amount,
            concurrent,
            "Allocating reserve"
        );

        self.allocator.allocate(&request, concurrent).await
    }

    /// Records a completed reservation request for the user.
    pub async fn record_completion(&self, user_id: UserId) -> u64 {
        self.tracker.record_completion(user_id).await
    }

    /// Every reserve the ledger holds for the user.
    pub async fn list_from_ledger(&self, user_id: UserId) -> AppResult<Vec<Reserve>> {
        self.allocator.list_from_ledger(user_id).await
    }

    /// The user's pooled reserves, largest first.
    pub async fn list_from_registry(&self, user_id: UserId) -> Vec<Reserve> {
        self.allocator.list_from_registry(user_id).await
    }
}
