//! The reserve entity and its enumerations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger identifier of a reserve.
pub type ReserveId = i64;

/// Identifier of the user a reserve is held for.
pub type UserId = u64;

/// Provenance of a reserve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReserveVersion {
    /// Oversized reserve posted to feed a pool.
    InitialTbs,
    /// Reserve posted directly for a single request.
    Standalone,
    /// What is left of a pooled reserve after a split.
    SplittedRest,
    /// Request-sized reserve split off a pooled one.
    Splitted,
}

/// Lifecycle state of a reserve. `Released` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReserveStatus {
    /// Funds are held.
    Reserved,
    /// Funds were given back; the reserve no longer changes.
    Released,
}

/// How the reserve is meant to be captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Captured in full.
    Total,
    /// Captured in parts.
    Partial,
}

impl Mode {
    /// Every accepted mode.
    pub const ALL: [Mode; 2] = [Mode::Total, Mode::Partial];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Partial => "partial",
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("unknown mode '{s}'"))
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why funds are being held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// Hold ahead of a payment.
    ReserveForPayment,
}

impl Reason {
    /// Every accepted reason.
    pub const ALL: [Reason; 1] = [Reason::ReserveForPayment];

    /// Wire name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReserveForPayment => "reserve_for_payment",
        }
    }
}

impl FromStr for Reason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| format!("unknown reason '{s}'"))
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hold of funds against a user account.
///
/// Instances are only ever produced by a ledger client: post creates one,
/// split replaces a parent with a remainder and a child, release terminates
/// one. Only `id`, `version`, `amount` and `status` are exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserve {
    /// Ledger identifier.
    pub id: ReserveId,
    /// Provenance tag.
    pub version: Option<ReserveVersion>,
    /// Caller-supplied reference.
    #[serde(skip)]
    pub external_reference: String,
    /// Caller-supplied idempotency key.
    #[serde(skip)]
    pub idempotency_key: String,
    /// Why the funds are held.
    #[serde(skip, default = "default_reason")]
    pub reason: Reason,
    /// How the reserve is captured.
    #[serde(skip, default = "default_mode")]
    pub mode: Mode,
    /// Amount in minor units.
    pub amount: i64,
    /// Client that requested the reserve.
    #[serde(skip)]
    pub client_id: String,
    /// Owner of the reserve.
    #[serde(skip)]
    pub user_id: UserId,
    /// Lifecycle state.
    pub status: ReserveStatus,
    /// Creation time.
    #[serde(skip, default = "Utc::now")]
    pub date_created: DateTime<Utc>,
    /// Last mutation time.
    #[serde(skip, default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl Reserve {
    /// Whether funds are still held.
    pub fn is_reserved(&self) -> bool {
        self.status == ReserveStatus::Reserved
    }

    /// Return a copy tagged with another version.
    pub fn tagged(mut self, version: ReserveVersion) -> Self {
        self.version = Some(version);
        self
    }
}

fn default_reason() -> Reason {
    Reason::ReserveForPayment
}

fn default_mode() -> Mode {
    Mode::Total
}
