//! Trait seams between the core and its external collaborators.

pub mod ledger;

pub use ledger::LedgerClient;
