//! Cache key builders for document object cache entries.
//!
//! Keys are the SHA-256 of `scope:relative/path`, so paths of any length
//! map to fixed-size keys and scopes never collide.

use sha2::{Digest, Sha256};

use damfs_core::types::DamPath;

/// Cache key for the document at `path` within `scope`.
///
/// The path is normalized first: no leading or trailing slash, no empty
/// segments.
pub fn document_key(scope: &str, path: &DamPath) -> String {
    let mut hasher = Sha256::new();
    hasher.update(scope.as_bytes());
    hasher.update(b":");
    hasher.update(path.relative().as_bytes());
    format!("{:x}", hasher.finalize())
}
