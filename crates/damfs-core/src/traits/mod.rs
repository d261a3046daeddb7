//! Core traits defined in `damfs-core` and implemented by other crates.

pub mod cache;
pub mod gateway;

pub use cache::ObjectCache;
pub use gateway::{CloneTarget, DocumentPage, DocumentRecord, FolderRecord, RemoteGateway};
