//! # damfs-core
//!
//! Core crate for DamFS. Contains the remote gateway and object cache
//! traits, configuration schemas, path and typed identifier types,
//! name sanitizing, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DamFS crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
