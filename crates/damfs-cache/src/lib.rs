//! # damfs-cache
//!
//! Document object cache for the file-system adapter. Two providers:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka)
//! - **none**: Stores nothing; every lookup misses
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod noop;
pub mod provider;

pub use provider::CacheManager;
