//! Gateway provider implementations.

pub mod memory;

pub use memory::MemoryGateway;
