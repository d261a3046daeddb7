//! Remote gateway trait: the calls the repository makes against the DAM
//! server.
//!
//! The transport behind it (protocol, authentication, retries, timeouts) is
//! the implementation's business. Lookups that can legitimately miss return
//! `Option`; every other failure is an [`AppError`](crate::error::AppError),
//! normally of kind `Remote`.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{DocumentId, FolderId, TimeKind};

/// Remote metadata of one folder (category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRecord {
    /// Folder id.
    pub id: FolderId,
    /// Parent folder id; `None` only for the root.
    pub parent_id: Option<FolderId>,
    /// Raw display name.
    pub name: String,
    /// Creation time, if the remote reports it.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Owner login, if the remote reports it.
    #[serde(default)]
    pub owner: Option<String>,
}

/// Remote metadata of one document (medium).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Document id.
    pub id: DocumentId,
    /// The folder holding the document.
    pub folder_id: FolderId,
    /// Raw display name.
    pub name: String,
    /// MIME type, if known.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Content size in bytes.
    #[serde(default)]
    pub size_bytes: u64,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    /// Owner login.
    #[serde(default)]
    pub owner: Option<String>,
}

/// One window of a folder's document listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Documents in this window, in remote order.
    pub items: Vec<DocumentRecord>,
    /// Total number of documents in the folder, independent of the window.
    pub total_count: u64,
}

/// Where `clone_document` puts the copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneTarget {
    /// Overwrite the data of this existing document instead of creating one.
    pub document: Option<DocumentId>,
    /// Folder for a newly created copy.
    pub parent: Option<FolderId>,
    /// Display name for a newly created copy.
    pub name: Option<String>,
}

/// Trait for DAM server access.
///
/// Name arguments of `find_*_by_name` are sanitized path segments; the
/// implementation matches them against the sanitized display names of the
/// children.
#[async_trait]
pub trait RemoteGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch one folder's metadata.
    async fn get_folder(&self, id: FolderId) -> AppResult<Option<FolderRecord>>;

    /// List all direct subfolders of a folder, in remote order.
    async fn list_subfolders(&self, parent: FolderId) -> AppResult<Vec<FolderRecord>>;

    /// Find the direct subfolder whose sanitized name equals `name`.
    async fn find_subfolder_by_name(
        &self,
        parent: FolderId,
        name: &str,
    ) -> AppResult<Option<FolderRecord>>;

    /// List a window of a folder's documents together with the total count.
    async fn list_documents(
        &self,
        parent: FolderId,
        offset: u64,
        count: u64,
    ) -> AppResult<DocumentPage>;

    /// Find the document in `parent` whose sanitized name equals `name`.
    async fn find_document_by_name(
        &self,
        parent: FolderId,
        name: &str,
    ) -> AppResult<Option<DocumentRecord>>;

    /// Fetch one document's metadata, including its parent folder.
    async fn get_document(&self, id: DocumentId) -> AppResult<Option<DocumentRecord>>;

    /// Download a document's content.
    async fn read_document(&self, id: DocumentId) -> AppResult<Bytes>;

    /// Create a folder and return its id.
    async fn create_folder(&self, parent: FolderId, name: &str) -> AppResult<FolderId>;

    /// Upload a new document and return its id.
    async fn create_document(
        &self,
        parent: FolderId,
        name: &str,
        data: Bytes,
    ) -> AppResult<DocumentId>;

    /// Rename a folder; returns the name the remote stored.
    async fn rename_folder(&self, id: FolderId, new_name: &str) -> AppResult<String>;

    /// Rename a document.
    async fn rename_document(&self, id: DocumentId, new_name: &str) -> AppResult<()>;

    /// Move a folder under a new parent; returns the name the remote stored.
    async fn move_folder(&self, id: FolderId, new_parent: FolderId) -> AppResult<String>;

    /// Update a document's folder membership and/or name.
    async fn update_document(
        &self,
        id: DocumentId,
        new_parent: Option<FolderId>,
        new_name: Option<&str>,
    ) -> AppResult<()>;

    /// Copy a document's data, either into an existing document or into a
    /// new one; returns the id holding the copy.
    async fn clone_document(&self, id: DocumentId, target: CloneTarget) -> AppResult<DocumentId>;

    /// Delete a folder and everything below it.
    async fn delete_folder(&self, id: FolderId) -> AppResult<()>;

    /// Delete a document.
    async fn delete_document(&self, id: DocumentId) -> AppResult<()>;

    /// Set one of a document's timestamps.
    async fn set_document_timestamp(
        &self,
        id: DocumentId,
        kind: TimeKind,
        value: DateTime<Utc>,
    ) -> AppResult<()>;
}
