//! # damfs-gateway
//!
//! Remote gateway providers for DamFS. Ships an in-memory model of a DAM
//! server that can be seeded programmatically or from a JSON snapshot, and
//! that counts every call it serves.

pub mod manager;
pub mod providers;
pub mod snapshot;

pub use manager::{Connection, connect};
pub use providers::MemoryGateway;
pub use snapshot::TreeSnapshot;
