//! Background tasks for the reserve pool service.
//!
//! This crate provides:
//! - A supervisor that runs at most one task per `(kind, user)` pair and
//!   shares a shutdown signal with all of them
//! - The heat decay job that cools a user's heat counter down to zero
//! - The pool expiration job that releases stale pooled reserves

pub mod jobs;
pub mod supervisor;

pub use jobs::decay::HeatDecayJob;
pub use jobs::expiration::PoolExpirationJob;
pub use supervisor::{TaskContext, TaskKey, TaskKind, TaskSupervisor};
