//! Path-based facade over a [`Repository`] and a document object cache.

use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use damfs_cache::CacheManager;
use damfs_cache::keys::document_key;
use damfs_core::config::cache::CacheConfig;
use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::cache::ObjectCache;
use damfs_core::types::DamPath;
use damfs_repository::{Document, Node, Repository};

use crate::entry::DirEntry;

/// File-system adapter.
///
/// Cloning is cheap; clones share the repository and the document cache.
#[derive(Debug, Clone)]
pub struct FsAdapter {
    repository: Arc<Repository>,
    documents: Arc<dyn ObjectCache<Document>>,
    scope: String,
}

impl FsAdapter {
    /// Create an adapter over an existing document cache.
    pub fn new(
        repository: Arc<Repository>,
        documents: Arc<dyn ObjectCache<Document>>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            documents,
            scope: scope.into(),
        }
    }

    /// Create an adapter with the document cache selected by `config`.
    pub fn from_config(
        repository: Arc<Repository>,
        config: &CacheConfig,
        scope: impl Into<String>,
    ) -> AppResult<Self> {
        let documents = CacheManager::<Document>::new(config)?;
        Ok(Self::new(repository, Arc::new(documents), scope))
    }

    /// The underlying repository.
    pub fn repository(&self) -> &Arc<Repository> {
        &self.repository
    }

    /// The document cache.
    pub fn document_cache(&self) -> &dyn ObjectCache<Document> {
        self.documents.as_ref()
    }

    fn key(&self, path: &DamPath) -> String {
        document_key(&self.scope, path)
    }

    /// The document at `path`, or `None` if there is none.
    ///
    /// A cached snapshot is returned without touching the repository.
    /// Otherwise the parent folder is resolved and the name looked up
    /// without filling the parent's subfolder list. Only hits are cached:
    /// a miss asks the repository again next time.
    pub async fn document_by_path(&self, path: &DamPath) -> AppResult<Option<Document>> {
        if path.is_root() {
            return Ok(None);
        }

        let key = self.key(path);
        if let Some(document) = self.documents.get(&key).await? {
            debug!(path = %path, "Document cache hit");
            return Ok(Some(document));
        }

        let parent = match self.repository.resolve_folder(&path.parent()).await {
            Ok(parent) => parent,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };

        match parent
            .child_by_name(&self.repository, path.basename(), false)
            .await?
        {
            Some(Node::Document(document)) => {
                let stored = self.documents.set_if_absent(&key, document.clone()).await?;
                debug!(path = %path, stored, "Document resolved");
                Ok(Some(document))
            }
            Some(Node::Folder(_)) | None => Ok(None),
        }
    }

    /// The node at `path`. Documents come from the document cache when
    /// possible, folders from the repository's path cache.
    pub async fn node(&self, path: &DamPath) -> AppResult<Node> {
        if !path.is_root() {
            if let Some(document) = self.documents.get(&self.key(path)).await? {
                return Ok(Node::Document(document));
            }
        }

        let node = self.repository.resolve(path).await?;
        if let Node::Document(document) = &node {
            self.documents
                .set_if_absent(&self.key(path), document.clone())
                .await?;
        }
        Ok(node)
    }

    /// Whether anything exists at `path`.
    pub async fn exists(&self, path: &DamPath) -> AppResult<bool> {
        match self.node(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Entry metadata for `path`.
    pub async fn stat(&self, path: &DamPath) -> AppResult<DirEntry> {
        let node = self.node(path).await?;
        Ok(DirEntry::from(&node))
    }

    /// A window over the folder at `path`: subfolders first, then
    /// documents. `limit` of `None` lists everything from `offset` on.
    pub async fn list(
        &self,
        path: &DamPath,
        offset: usize,
        limit: Option<usize>,
    ) -> AppResult<Vec<DirEntry>> {
        let folder = match self.node(path).await? {
            Node::Folder(folder) => folder,
            Node::Document(_) => {
                return Err(AppError::invalid_argument(format!(
                    "{path} is a document, not a folder"
                )));
            }
        };

        let children = folder.children(&self.repository, offset, limit).await?;
        Ok(children.iter().map(DirEntry::from).collect())
    }

    /// The content of the document at `path`.
    pub async fn read(&self, path: &DamPath) -> AppResult<Bytes> {
        let document = self
            .document_by_path(path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{path} is not a document")))?;
        document.read(&self.repository).await
    }

    /// Drop the memoized document for `path`, e.g. after changing it.
    pub async fn forget(&self, path: &DamPath) -> AppResult<()> {
        debug!(path = %path, "Forgetting cached document");
        self.documents.invalidate(&self.key(path)).await
    }

    /// Drop every memoized document.
    pub async fn forget_all(&self) -> AppResult<()> {
        self.documents.clear().await
    }
}
