//! In-memory DAM server model.
//!
//! Behaves like a remote for the repository: every call is counted per
//! operation and can be slowed down by a fixed latency, which is what the
//! cache behaviour tests observe.

mod tree;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::gateway::{
    CloneTarget, DocumentPage, DocumentRecord, FolderRecord, RemoteGateway,
};
use damfs_core::types::{DocumentId, FolderId, TimeKind};

pub(crate) use tree::{StoredDocument, Tree};

/// Operation names used as call-counter keys.
pub mod ops {
    pub const GET_FOLDER: &str = "get_folder";
    pub const LIST_SUBFOLDERS: &str = "list_subfolders";
    pub const FIND_SUBFOLDER_BY_NAME: &str = "find_subfolder_by_name";
    pub const LIST_DOCUMENTS: &str = "list_documents";
    pub const FIND_DOCUMENT_BY_NAME: &str = "find_document_by_name";
    pub const GET_DOCUMENT: &str = "get_document";
    pub const READ_DOCUMENT: &str = "read_document";
    pub const CREATE_FOLDER: &str = "create_folder";
    pub const CREATE_DOCUMENT: &str = "create_document";
    pub const RENAME_FOLDER: &str = "rename_folder";
    pub const RENAME_DOCUMENT: &str = "rename_document";
    pub const MOVE_FOLDER: &str = "move_folder";
    pub const UPDATE_DOCUMENT: &str = "update_document";
    pub const CLONE_DOCUMENT: &str = "clone_document";
    pub const DELETE_FOLDER: &str = "delete_folder";
    pub const DELETE_DOCUMENT: &str = "delete_document";
    pub const SET_DOCUMENT_TIMESTAMP: &str = "set_document_timestamp";

    pub(crate) const ALL: &[&str] = &[
        GET_FOLDER,
        LIST_SUBFOLDERS,
        FIND_SUBFOLDER_BY_NAME,
        LIST_DOCUMENTS,
        FIND_DOCUMENT_BY_NAME,
        GET_DOCUMENT,
        READ_DOCUMENT,
        CREATE_FOLDER,
        CREATE_DOCUMENT,
        RENAME_FOLDER,
        RENAME_DOCUMENT,
        MOVE_FOLDER,
        UPDATE_DOCUMENT,
        CLONE_DOCUMENT,
        DELETE_FOLDER,
        DELETE_DOCUMENT,
        SET_DOCUMENT_TIMESTAMP,
    ];
}

/// Default id of the root folder.
pub const DEFAULT_ROOT_ID: FolderId = FolderId(1);

/// In-memory [`RemoteGateway`].
#[derive(Debug)]
pub struct MemoryGateway {
    tree: RwLock<Tree>,
    calls: BTreeMap<&'static str, AtomicU64>,
    latency: Duration,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    /// A gateway holding only a root folder with id 1.
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT_ID)
    }

    /// A gateway holding only a root folder with the given id.
    pub fn with_root(root_id: FolderId) -> Self {
        Self::from_tree(Tree::new(root_id, "root"))
    }

    pub(crate) fn from_tree(tree: Tree) -> Self {
        Self {
            tree: RwLock::new(tree),
            calls: ops::ALL.iter().map(|op| (*op, AtomicU64::new(0))).collect(),
            latency: Duration::ZERO,
        }
    }

    /// Delay every served call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The root folder id.
    pub async fn root_id(&self) -> FolderId {
        self.tree.read().await.root_id
    }

    /// Seed a folder without counting a call.
    pub async fn add_folder(&self, parent: FolderId, name: &str) -> AppResult<FolderId> {
        self.tree.write().await.insert_folder(parent, name)
    }

    /// Seed a document without counting a call.
    pub async fn add_document(
        &self,
        parent: FolderId,
        name: &str,
        content: impl Into<Bytes>,
    ) -> AppResult<DocumentId> {
        self.tree
            .write()
            .await
            .insert_document(parent, name, content.into())
    }

    /// Number of calls served for one operation (see [`ops`]).
    pub fn calls(&self, operation: &str) -> u64 {
        self.calls
            .get(operation)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Number of calls served across all operations.
    pub fn total_calls(&self) -> u64 {
        self.calls.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    /// Per-operation call counts, skipping operations never called.
    pub fn call_counts(&self) -> BTreeMap<&'static str, u64> {
        self.calls
            .iter()
            .map(|(op, c)| (*op, c.load(Ordering::SeqCst)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Reset every call counter to zero.
    pub fn reset_calls(&self) {
        for counter in self.calls.values() {
            counter.store(0, Ordering::SeqCst);
        }
    }

    pub(crate) async fn tree_snapshot(&self) -> Tree {
        self.tree.read().await.clone()
    }

    async fn serve(&self, operation: &'static str) {
        if let Some(counter) = self.calls.get(operation) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        debug!(operation, "Remote call");
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl RemoteGateway for MemoryGateway {
    async fn get_folder(&self, id: FolderId) -> AppResult<Option<FolderRecord>> {
        self.serve(ops::GET_FOLDER).await;
        Ok(self.tree.read().await.folders.get(&id).cloned())
    }

    async fn list_subfolders(&self, parent: FolderId) -> AppResult<Vec<FolderRecord>> {
        self.serve(ops::LIST_SUBFOLDERS).await;
        let tree = self.tree.read().await;
        tree.folder(parent)?;
        Ok(tree.subfolders(parent).cloned().collect())
    }

    async fn find_subfolder_by_name(
        &self,
        parent: FolderId,
        name: &str,
    ) -> AppResult<Option<FolderRecord>> {
        self.serve(ops::FIND_SUBFOLDER_BY_NAME).await;
        let tree = self.tree.read().await;
        tree.folder(parent)?;
        Ok(tree.subfolder_named(parent, name).cloned())
    }

    async fn list_documents(
        &self,
        parent: FolderId,
        offset: u64,
        count: u64,
    ) -> AppResult<DocumentPage> {
        self.serve(ops::LIST_DOCUMENTS).await;
        let tree = self.tree.read().await;
        tree.folder(parent)?;

        let all: Vec<&StoredDocument> = tree.documents_in(parent).collect();
        let items = all
            .iter()
            .skip(offset as usize)
            .take(count as usize)
            .map(|d| d.record.clone())
            .collect();
        Ok(DocumentPage {
            items,
            total_count: all.len() as u64,
        })
    }

    async fn find_document_by_name(
        &self,
        parent: FolderId,
        name: &str,
    ) -> AppResult<Option<DocumentRecord>> {
        self.serve(ops::FIND_DOCUMENT_BY_NAME).await;
        let tree = self.tree.read().await;
        tree.folder(parent)?;
        Ok(tree.document_named(parent, name).map(|d| d.record.clone()))
    }

    async fn get_document(&self, id: DocumentId) -> AppResult<Option<DocumentRecord>> {
        self.serve(ops::GET_DOCUMENT).await;
        Ok(self
            .tree
            .read()
            .await
            .documents
            .get(&id)
            .map(|d| d.record.clone()))
    }

    async fn read_document(&self, id: DocumentId) -> AppResult<Bytes> {
        self.serve(ops::READ_DOCUMENT).await;
        Ok(self.tree.read().await.document(id)?.content.clone())
    }

    async fn create_folder(&self, parent: FolderId, name: &str) -> AppResult<FolderId> {
        self.serve(ops::CREATE_FOLDER).await;
        let id = self.tree.write().await.insert_folder(parent, name)?;
        info!(folder_id = %id, parent_id = %parent, name, "Remote folder created");
        Ok(id)
    }

    async fn create_document(
        &self,
        parent: FolderId,
        name: &str,
        data: Bytes,
    ) -> AppResult<DocumentId> {
        self.serve(ops::CREATE_DOCUMENT).await;
        let id = self.tree.write().await.insert_document(parent, name, data)?;
        info!(document_id = %id, parent_id = %parent, name, "Remote document created");
        Ok(id)
    }

    async fn rename_folder(&self, id: FolderId, new_name: &str) -> AppResult<String> {
        self.serve(ops::RENAME_FOLDER).await;
        self.tree.write().await.rename_folder(id, new_name)
    }

    async fn rename_document(&self, id: DocumentId, new_name: &str) -> AppResult<()> {
        self.serve(ops::RENAME_DOCUMENT).await;
        self.tree
            .write()
            .await
            .update_document(id, None, Some(new_name))
    }

    async fn move_folder(&self, id: FolderId, new_parent: FolderId) -> AppResult<String> {
        self.serve(ops::MOVE_FOLDER).await;
        self.tree.write().await.move_folder(id, new_parent)
    }

    async fn update_document(
        &self,
        id: DocumentId,
        new_parent: Option<FolderId>,
        new_name: Option<&str>,
    ) -> AppResult<()> {
        self.serve(ops::UPDATE_DOCUMENT).await;
        self.tree
            .write()
            .await
            .update_document(id, new_parent, new_name)
    }

    async fn clone_document(&self, id: DocumentId, target: CloneTarget) -> AppResult<DocumentId> {
        self.serve(ops::CLONE_DOCUMENT).await;
        let mut tree = self.tree.write().await;

        if let Some(existing) = target.document {
            tree.overwrite_document(id, existing)?;
            return Ok(existing);
        }

        let (parent, name, content) = {
            let source = tree.document(id)?;
            (
                target.parent.unwrap_or(source.record.folder_id),
                target.name.unwrap_or_else(|| source.record.name.clone()),
                source.content.clone(),
            )
        };
        tree.insert_document(parent, &name, content)
    }

    async fn delete_folder(&self, id: FolderId) -> AppResult<()> {
        self.serve(ops::DELETE_FOLDER).await;
        self.tree.write().await.remove_folder(id)
    }

    async fn delete_document(&self, id: DocumentId) -> AppResult<()> {
        self.serve(ops::DELETE_DOCUMENT).await;
        self.tree.write().await.remove_document(id)
    }

    async fn set_document_timestamp(
        &self,
        id: DocumentId,
        kind: TimeKind,
        value: DateTime<Utc>,
    ) -> AppResult<()> {
        self.serve(ops::SET_DOCUMENT_TIMESTAMP).await;
        let mut tree = self.tree.write().await;
        let record = tree.document_mut_record(id)?;
        match kind {
            TimeKind::Created => record.created_at = Some(value),
            TimeKind::Modified => record.modified_at = Some(value),
        }
        Ok(())
    }
}

/// Reject a snapshot whose tables do not form a tree under its root.
pub(crate) fn validate(tree: &Tree) -> AppResult<()> {
    let root = tree.folder(tree.root_id)?;
    if root.parent_id.is_some() {
        return Err(AppError::invalid_argument(format!(
            "Root folder {} must not have a parent",
            tree.root_id
        )));
    }
    for folder in tree.folders.values() {
        if folder.id != tree.root_id && !tree.is_within(folder.id, tree.root_id) {
            return Err(AppError::invalid_argument(format!(
                "Folder {} is not below root folder {}",
                folder.id, tree.root_id
            )));
        }
    }
    for document in tree.documents.values() {
        tree.folder(document.record.folder_id)?;
    }
    Ok(())
}
