//! Per-user background jobs.

pub mod decay;
pub mod expiration;
