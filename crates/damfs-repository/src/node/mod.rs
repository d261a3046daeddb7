//! Tree nodes: folders and documents.
//!
//! Nodes never own a reference back to the [`Repository`]; operations that
//! need the remote take the repository as an explicit context argument.

mod document;
mod folder;
mod load_state;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use damfs_core::result::AppResult;
use damfs_core::types::{DamPath, FolderId, NodeId, OverwriteMode, TimeKind};

use crate::repository::Repository;

pub use document::Document;
pub use folder::Folder;
pub use load_state::LoadState;

/// Node attributes: timestamps, content type, size, owner, raw display name.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Attribute key of the raw display name.
pub const DISPLAY_NAME: &str = "display_name";

/// One element of the tree.
#[derive(Debug, Clone)]
pub enum Node {
    /// A folder, shared with the repository's folder cache.
    Folder(Arc<Folder>),
    /// A document snapshot.
    Document(Document),
}

impl Node {
    /// The node id: digits for a folder, `d<digits>` for a document.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Folder(folder) => NodeId::Folder(folder.id()),
            Self::Document(document) => NodeId::Document(document.id()),
        }
    }

    /// The containing folder; `None` only for the root folder.
    pub fn parent_id(&self) -> Option<FolderId> {
        match self {
            Self::Folder(folder) => folder.parent_id(),
            Self::Document(document) => Some(document.folder_id()),
        }
    }

    /// The node's own path segment.
    pub fn path_segment(&self) -> &str {
        match self {
            Self::Folder(folder) => folder.path_segment(),
            Self::Document(document) => document.path_segment(),
        }
    }

    /// The raw display name the segment was sanitized from.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Folder(folder) => folder.display_name(),
            Self::Document(document) => document.display_name(),
        }
    }

    /// Look up one attribute.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes().get(key)
    }

    /// All attributes.
    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Folder(folder) => folder.attributes(),
            Self::Document(document) => document.attributes(),
        }
    }

    /// Whether this is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// The folder, if this is one.
    pub fn as_folder(&self) -> Option<&Arc<Folder>> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::Document(_) => None,
        }
    }

    /// The document, if this is one.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Folder(_) => None,
            Self::Document(document) => Some(document),
        }
    }

    /// Rename in place; returns the node as the remote now reports it.
    pub async fn rename(&self, ctx: &Repository, new_name: &str) -> AppResult<Node> {
        match self {
            Self::Folder(folder) => ctx.rename_folder(folder, new_name).await.map(Node::Folder),
            Self::Document(document) => ctx
                .rename_document(document, new_name)
                .await
                .map(Node::Document),
        }
    }

    /// Move under the folder at `target`, optionally renaming.
    pub async fn move_to(
        &self,
        ctx: &Repository,
        target: &DamPath,
        new_name: Option<&str>,
        mode: OverwriteMode,
    ) -> AppResult<Node> {
        match self {
            Self::Folder(folder) => ctx.move_folder(folder, target, new_name, mode).await,
            Self::Document(document) => ctx.move_document(document, target, new_name, mode).await,
        }
    }

    /// Copy under the folder at `target`, optionally renaming.
    pub async fn copy_to(
        &self,
        ctx: &Repository,
        target: &DamPath,
        new_name: Option<&str>,
        mode: OverwriteMode,
    ) -> AppResult<Node> {
        match self {
            Self::Folder(folder) => ctx.copy_folder(folder, target, new_name, mode).await,
            Self::Document(document) => ctx.copy_document(document, target, new_name, mode).await,
        }
    }

    /// Delete this node on the remote.
    pub async fn delete(&self, ctx: &Repository) -> AppResult<()> {
        match self {
            Self::Folder(folder) => ctx.delete_folder(folder).await,
            Self::Document(document) => ctx.delete_document(document).await,
        }
    }

    /// Set a timestamp. Folders have no settable timestamps.
    pub async fn set_time(
        &self,
        ctx: &Repository,
        kind: TimeKind,
        value: DateTime<Utc>,
    ) -> AppResult<()> {
        match self {
            Self::Folder(folder) => ctx.set_folder_time(folder, kind, value).await,
            Self::Document(document) => ctx.set_document_time(document, kind, value).await,
        }
    }
}

impl From<Arc<Folder>> for Node {
    fn from(folder: Arc<Folder>) -> Self {
        Self::Folder(folder)
    }
}

impl From<Document> for Node {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

/// Render an optional timestamp as an attribute value.
pub(crate) fn time_value(value: Option<DateTime<Utc>>) -> Option<serde_json::Value> {
    value.map(|ts| serde_json::Value::String(ts.to_rfc3339()))
}
