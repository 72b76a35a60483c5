//! Per-user concurrency detection.

pub mod tracker;

pub use tracker::HeatTracker;
