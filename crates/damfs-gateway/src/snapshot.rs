//! JSON import and export of the in-memory tree.
//!
//! Document content is stored base64-encoded next to the document record.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use damfs_core::error::{AppError, ErrorKind};
use damfs_core::result::AppResult;
use damfs_core::traits::gateway::{DocumentRecord, FolderRecord};
use damfs_core::types::FolderId;

use crate::providers::MemoryGateway;
use crate::providers::memory::{StoredDocument, Tree, validate};

/// Serialized form of a whole remote tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Id of the root folder.
    pub root_id: FolderId,
    /// Every folder, root included.
    pub folders: Vec<FolderRecord>,
    /// Every document with its content.
    #[serde(default)]
    pub documents: Vec<SnapshotDocument>,
}

/// One document in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(flatten)]
    pub record: DocumentRecord,
    /// Base64 content.
    #[serde(default)]
    pub content: String,
}

impl TreeSnapshot {
    fn into_tree(self) -> AppResult<Tree> {
        let mut next_id = self.root_id.get();
        let mut tree = Tree::new(self.root_id, "root");
        tree.folders.clear();

        for folder in self.folders {
            next_id = next_id.max(folder.id.get());
            tree.folders.insert(folder.id, folder);
        }
        for document in self.documents {
            let content = STANDARD.decode(document.content.as_bytes()).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Serialization,
                    format!("Invalid content encoding for document {}", document.record.id),
                    e,
                )
            })?;
            let mut record = document.record;
            record.size_bytes = content.len() as u64;
            next_id = next_id.max(record.id.get());
            tree.documents.insert(
                record.id,
                StoredDocument {
                    record,
                    content: Bytes::from(content),
                },
            );
        }
        tree.next_id = next_id + 1;

        validate(&tree)?;
        Ok(tree)
    }

    fn from_tree(tree: Tree) -> Self {
        Self {
            root_id: tree.root_id,
            folders: tree.folders.into_values().collect(),
            documents: tree
                .documents
                .into_values()
                .map(|d| SnapshotDocument {
                    content: STANDARD.encode(&d.content),
                    record: d.record,
                })
                .collect(),
        }
    }
}

impl MemoryGateway {
    /// Build a gateway from a snapshot.
    pub fn from_snapshot(snapshot: TreeSnapshot) -> AppResult<Self> {
        Ok(Self::from_tree(snapshot.into_tree()?))
    }

    /// Capture the current tree.
    pub async fn snapshot(&self) -> TreeSnapshot {
        TreeSnapshot::from_tree(self.tree_snapshot().await)
    }

    /// Load a gateway from a JSON snapshot file.
    pub async fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read snapshot: {}", path.display()),
                e,
            )
        })?;
        let snapshot: TreeSnapshot = serde_json::from_slice(&raw)?;
        info!(
            path = %path.display(),
            folders = snapshot.folders.len(),
            documents = snapshot.documents.len(),
            "Loaded gateway snapshot"
        );
        Self::from_snapshot(snapshot)
    }

    /// Write the current tree to a JSON snapshot file.
    pub async fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot().await;
        let raw = serde_json::to_vec_pretty(&snapshot)?;
        tokio::fs::write(path, raw).await?;
        info!(path = %path.display(), "Saved gateway snapshot");
        Ok(())
    }
}
