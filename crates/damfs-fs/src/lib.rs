//! # damfs-fs
//!
//! The surface a file-system front end talks to. Paths go in, directory
//! entries and content come out. Documents looked up by path are memoized
//! in an [`ObjectCache`](damfs_core::traits::cache::ObjectCache) keyed by
//! storage scope and path; folders are served from the repository's own
//! caches.

pub mod adapter;
pub mod entry;

pub use adapter::FsAdapter;
pub use entry::{DirEntry, EntryKind};
