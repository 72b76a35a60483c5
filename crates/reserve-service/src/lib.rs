//! # reserve-service
//!
//! Business logic of the reserve pool service. [`HeatTracker`] classifies a
//! user's traffic, [`AllocationService`] turns a request into a reserve via
//! the ledger (directly or through the user's pool), and [`ReserveService`]
//! is the use-case facade the HTTP layer calls.
//!
//! Services follow constructor injection; shared collaborators are passed
//! in as `Arc` references.

pub mod allocator;
pub mod concurrency;
pub mod reserve;

pub use allocator::AllocationService;
pub use concurrency::HeatTracker;
pub use reserve::ReserveService;
