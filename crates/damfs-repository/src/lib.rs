//! # damfs-repository
//!
//! Client-side model of a remote DAM tree. The [`Repository`] turns
//! slash-separated paths into folder and document nodes with as few remote
//! round-trips as it can, keeping every resolved folder in one arena
//! indexed both by folder id and by path. Each [`Folder`] carries a lazily
//! filled child cache that mutations invalidate.

pub mod node;
pub mod repository;

pub use node::{Attributes, Document, Folder, LoadState, Node};
pub use repository::{CacheStats, Repository, RepositorySettings};
