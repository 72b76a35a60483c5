//! Domain types shared by the ledger, the pool registry and the HTTP layer.

pub mod request;
pub mod reserve;

pub use request::ReserveRequest;
pub use reserve::{Mode, Reason, Reserve, ReserveId, ReserveStatus, ReserveVersion, UserId};
