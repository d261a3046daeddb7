//! Repository configuration.

use serde::{Deserialize, Serialize};

/// Path resolution and folder cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Well-known id of the remote root folder.
    #[serde(default = "default_root_folder_id")]
    pub root_folder_id: u64,
    /// Refuse every mutation with `NotSupported`.
    #[serde(default)]
    pub read_only: bool,
    /// Scope prefix for document object cache keys.
    #[serde(default = "default_storage_scope")]
    pub storage_scope: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            root_folder_id: default_root_folder_id(),
            read_only: false,
            storage_scope: default_storage_scope(),
        }
    }
}

fn default_root_folder_id() -> u64 {
    1
}

fn default_storage_scope() -> String {
    "default".to_string()
}
