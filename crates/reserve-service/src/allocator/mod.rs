//! Reserve allocation engine.

pub mod service;

pub use service::AllocationService;
