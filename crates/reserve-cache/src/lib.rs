//! # reserve-cache
//!
//! Process-local, per-user state for the reserve pool service:
//!
//! - **keyed**: a keyed-lock store handing out run-under-lock transactions
//! - **pool**: the strongly typed, amount-ordered pool of pooled reserves
//! - **registry**: per-user pools built on the keyed store
//! - **heat**: per-user heat counters built on the keyed store
//!
//! Nothing here is persisted; entries vanish once their value empties.

pub mod heat;
pub mod keyed;
pub mod pool;
pub mod registry;

pub use heat::HeatMap;
pub use keyed::{KeyedStore, Vacant};
pub use pool::{Pool, PoolKey};
pub use registry::PoolRegistry;
