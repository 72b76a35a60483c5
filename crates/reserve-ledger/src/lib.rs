//! # reserve-ledger
//!
//! Stand-in for the system of record. [`MemoryLedger`] keeps reserves in
//! memory in major units and simulates call latency;
//! [`SimulatedLedgerClient`] is the [`LedgerClient`] the service talks to,
//! adding the minor-unit scaling and optional failure injection.
//!
//! [`LedgerClient`]: reserve_core::traits::LedgerClient

pub mod client;
pub mod memory;

pub use client::SimulatedLedgerClient;
pub use memory::MemoryLedger;
