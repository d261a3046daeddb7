//! The repository: a folder cache indexed by id and by path, plus the
//! operations that resolve and mutate the remote tree through it.

mod document_ops;
mod folder_ops;
mod index;
mod resolve;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use damfs_core::config::repository::RepositoryConfig;
use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::gateway::{FolderRecord, RemoteGateway};
use damfs_core::types::{DamPath, DocumentId, FolderId, NodeId};

use crate::node::{Document, Folder, Node};

pub use index::CacheStats;
use index::FolderIndex;

/// Repository behaviour switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    /// Well-known id of the root folder.
    pub root_folder_id: FolderId,
    /// Refuse every mutation with `NotSupported`.
    pub read_only: bool,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self::from(&RepositoryConfig::default())
    }
}

impl From<&RepositoryConfig> for RepositorySettings {
    fn from(config: &RepositoryConfig) -> Self {
        Self {
            root_folder_id: FolderId(config.root_folder_id),
            read_only: config.read_only,
        }
    }
}

/// Resolves paths and ids against a remote tree, caching every folder it
/// sees.
///
/// One repository serves one connection. Folder instances live in an arena
/// behind an `RwLock`; documents are never cached here.
#[derive(Debug)]
pub struct Repository {
    gateway: Arc<dyn RemoteGateway>,
    settings: RepositorySettings,
    index: RwLock<FolderIndex>,
}

impl Repository {
    /// Creates a new repository over the given gateway.
    pub fn new(gateway: Arc<dyn RemoteGateway>, settings: RepositorySettings) -> Self {
        Self {
            gateway,
            settings,
            index: RwLock::new(FolderIndex::default()),
        }
    }

    /// The remote gateway.
    pub fn gateway(&self) -> &dyn RemoteGateway {
        self.gateway.as_ref()
    }

    /// The behaviour switches.
    pub fn settings(&self) -> &RepositorySettings {
        &self.settings
    }

    /// The root folder, bound to `/` in the path cache.
    pub async fn root(&self) -> AppResult<Arc<Folder>> {
        let root_key = DamPath::root().to_string();
        let generation = {
            let index = self.index.read().await;
            if let Some(root) = index.by_path(&root_key) {
                return Ok(root);
            }
            index.generation()
        };

        let root = self.folder_by_id(self.settings.root_folder_id).await?;
        Ok(self.index.write().await.bind_path(root_key, root, generation))
    }

    /// A folder by id: from the id cache, else rebuilt from a kept record,
    /// else fetched from the remote.
    pub async fn folder_by_id(&self, id: FolderId) -> AppResult<Arc<Folder>> {
        let generation = {
            let index = self.index.read().await;
            if let Some(folder) = index.by_id(id) {
                return Ok(folder);
            }
            index.generation()
        };

        let kept = self.index.read().await.record(id);
        let record = match kept {
            Some(record) => record,
            None => {
                debug!(folder_id = %id, "Fetching folder record");
                self.gateway
                    .get_folder(id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Folder {id} does not exist")))?
            }
        };

        Ok(self.adopt_folder(record, generation).await)
    }

    /// A document by id. Always asks the remote.
    pub async fn document_by_id(&self, id: DocumentId) -> AppResult<Document> {
        self.gateway
            .get_document(id)
            .await?
            .map(Document::from_record)
            .ok_or_else(|| AppError::not_found(format!("Document {id} does not exist")))
    }

    /// A node by its id string: digits for a folder, `d<digits>` for a
    /// document.
    pub async fn node_by_id(&self, id: &str) -> AppResult<Node> {
        match id.parse::<NodeId>()? {
            NodeId::Folder(id) => self.folder_by_id(id).await.map(Node::Folder),
            NodeId::Document(id) => self.document_by_id(id).await.map(Node::Document),
        }
    }

    /// The path of a node, computed by walking its parents up to the root.
    pub async fn path_of(&self, node: &Node) -> AppResult<DamPath> {
        let root_id = self.settings.root_folder_id;
        if let Node::Folder(folder) = node {
            if folder.id() == root_id {
                return Ok(DamPath::root());
            }
        }

        let mut segments = vec![node.path_segment().to_string()];
        let mut cursor = node.parent_id();
        loop {
            match cursor {
                Some(id) if id == root_id => break,
                Some(id) => {
                    let folder = self.folder_by_id(id).await?;
                    segments.push(folder.path_segment().to_string());
                    cursor = folder.parent_id();
                }
                None => {
                    return Err(AppError::not_found(format!(
                        "Node {} is not below root folder {root_id}",
                        node.id()
                    )));
                }
            }
        }

        segments.reverse();
        Ok(DamPath::from_segments(segments))
    }

    /// Drop every cached folder, path, and record.
    pub async fn reset_caches(&self) {
        let mut index = self.index.write().await;
        let before = index.stats();
        index.clear();
        info!(
            folders = before.folders,
            paths = before.paths,
            generation = index.generation(),
            "Repository caches reset"
        );
    }

    /// Current cache sizes.
    pub async fn cache_stats(&self) -> CacheStats {
        self.index.read().await.stats()
    }

    pub(crate) async fn generation(&self) -> u64 {
        self.index.read().await.generation()
    }

    /// Register a folder seen in a remote response; see [`FolderIndex::adopt`].
    pub(crate) async fn adopt_folder(&self, record: FolderRecord, generation: u64) -> Arc<Folder> {
        self.index.write().await.adopt(record, generation)
    }

    pub(crate) async fn bind_path(
        &self,
        path: &DamPath,
        folder: Arc<Folder>,
        generation: u64,
    ) -> Arc<Folder> {
        self.index
            .write()
            .await
            .bind_path(path.to_string(), folder, generation)
    }

    /// Invalidate the cached instance of `id`, if there is one.
    pub(crate) async fn invalidate_cached(&self, id: Option<FolderId>) {
        let Some(id) = id else { return };
        let cached = self.index.read().await.by_id(id);
        if let Some(folder) = cached {
            folder.invalidate_child_cache().await;
        }
    }

    pub(crate) fn ensure_writable(&self, operation: &str) -> AppResult<()> {
        if self.settings.read_only {
            tracing::warn!(operation, "Refusing mutation on read-only repository");
            return Err(AppError::not_supported(format!(
                "{operation} is not supported on a read-only repository"
            )));
        }
        Ok(())
    }
}
