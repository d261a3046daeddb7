//! Folder nodes and their child caches.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::debug;

use damfs_core::result::AppResult;
use damfs_core::traits::gateway::FolderRecord;
use damfs_core::types::{FolderId, sanitize_segment};

use super::{Attributes, DISPLAY_NAME, Document, LoadState, Node, time_value};
use crate::repository::Repository;

/// Cached children of one folder. Both parts are invalidated together.
#[derive(Debug, Default)]
struct ChildCache {
    subfolders: LoadState<Vec<Arc<Folder>>>,
    document_count: LoadState<u64>,
}

/// A folder (remote category).
///
/// At most one live instance per folder id is reachable through a
/// repository's caches. The child cache lock is held across the remote fill,
/// so only one task populates a given folder at a time.
#[derive(Debug)]
pub struct Folder {
    id: FolderId,
    parent_id: Option<FolderId>,
    segment: String,
    attributes: Attributes,
    children: Mutex<ChildCache>,
    invalidations: AtomicU64,
}

impl Folder {
    /// Build a folder from its remote record, with an empty child cache.
    pub fn from_record(record: FolderRecord) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(DISPLAY_NAME.to_string(), record.name.clone().into());
        if let Some(owner) = record.owner {
            attributes.insert("owner".to_string(), owner.into());
        }
        if let Some(created) = time_value(record.created_at) {
            attributes.insert("created_at".to_string(), created);
        }

        Self {
            id: record.id,
            parent_id: record.parent_id,
            segment: sanitize_segment(&record.name),
            attributes,
            children: Mutex::new(ChildCache::default()),
            invalidations: AtomicU64::new(0),
        }
    }

    /// The folder id.
    pub fn id(&self) -> FolderId {
        self.id
    }

    /// The parent folder; `None` for the remote root.
    pub fn parent_id(&self) -> Option<FolderId> {
        self.parent_id
    }

    /// The sanitized name used as path segment.
    pub fn path_segment(&self) -> &str {
        &self.segment
    }

    /// The raw display name.
    pub fn display_name(&self) -> &str {
        self.attributes
            .get(DISPLAY_NAME)
            .and_then(|v| v.as_str())
            .unwrap_or(&self.segment)
    }

    /// All attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Look up one attribute.
    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    /// How many times this instance's child cache has been invalidated.
    pub fn invalidation_count(&self) -> u64 {
        self.invalidations.load(Ordering::Relaxed)
    }

    /// Whether the subfolder list is currently cached.
    pub async fn has_cached_subfolders(&self) -> bool {
        self.children.lock().await.subfolders.is_loaded()
    }

    /// Drop the cached subfolder list and document count.
    pub async fn invalidate_child_cache(&self) {
        let mut cache = self.children.lock().await;
        cache.subfolders.invalidate();
        cache.document_count.invalidate();
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        debug!(folder_id = %self.id, "Invalidated child cache");
    }

    /// A window over subfolders followed by documents.
    ///
    /// `count` of `None` means everything from `offset` on.
    pub async fn children(
        &self,
        ctx: &Repository,
        offset: usize,
        count: Option<usize>,
    ) -> AppResult<Vec<Node>> {
        let folders = self.load_subfolders(ctx).await?;
        let folder_total = folders.len();

        let mut nodes: Vec<Node> = folders
            .into_iter()
            .skip(offset)
            .take(count.unwrap_or(usize::MAX))
            .map(Node::Folder)
            .collect();

        let remaining = count.map(|c| c.saturating_sub(nodes.len()));
        if remaining == Some(0) {
            return Ok(nodes);
        }

        let document_offset = offset.saturating_sub(folder_total);
        let documents = self.documents(ctx, document_offset, remaining).await?;
        nodes.extend(documents.into_iter().map(Node::Document));
        Ok(nodes)
    }

    /// A window over the cached subfolder list, filling it if needed.
    pub async fn subfolders(
        &self,
        ctx: &Repository,
        offset: usize,
        count: Option<usize>,
    ) -> AppResult<Vec<Arc<Folder>>> {
        let folders = self.load_subfolders(ctx).await?;
        Ok(folders
            .into_iter()
            .skip(offset)
            .take(count.unwrap_or(usize::MAX))
            .collect())
    }

    /// A window over the documents. Always asks the remote; documents are
    /// not cached at this layer, only their count.
    pub async fn documents(
        &self,
        ctx: &Repository,
        offset: usize,
        count: Option<usize>,
    ) -> AppResult<Vec<Document>> {
        let limit = match count {
            Some(count) => count as u64,
            None => self
                .total_document_count(ctx)
                .await?
                .saturating_sub(offset as u64),
        };
        if limit == 0 {
            return Ok(Vec::new());
        }

        let page = ctx
            .gateway()
            .list_documents(self.id, offset as u64, limit)
            .await?;

        self.children.lock().await.document_count = LoadState::Loaded(page.total_count);

        Ok(page.items.into_iter().map(Document::from_record).collect())
    }

    /// Number of subfolders. Fills the subfolder list if needed.
    pub async fn total_folder_count(&self, ctx: &Repository) -> AppResult<usize> {
        Ok(self.load_subfolders(ctx).await?.len())
    }

    /// Number of documents.
    ///
    /// When unknown, lists a single document and keeps only the total count
    /// the remote reports alongside it.
    pub async fn total_document_count(&self, ctx: &Repository) -> AppResult<u64> {
        let mut cache = self.children.lock().await;
        if let Some(count) = cache.document_count.get() {
            return Ok(*count);
        }

        debug!(folder_id = %self.id, "Probing document count");
        let page = ctx.gateway().list_documents(self.id, 0, 1).await?;
        cache.document_count = LoadState::Loaded(page.total_count);
        Ok(page.total_count)
    }

    /// Find the child whose path segment is exactly `name`.
    ///
    /// `name` is matched as given: `docs...` does not find a folder whose
    /// segment is `docs`, so every path cached below stays canonical.
    ///
    /// With `populate`, a missing subfolder list is fetched and cached, then
    /// scanned. Without it, and only while the list is not cached, a single
    /// targeted remote query is issued instead and nothing is cached. A
    /// folder miss falls through to a document lookup by name.
    pub async fn child_by_name(
        &self,
        ctx: &Repository,
        name: &str,
        populate: bool,
    ) -> AppResult<Option<Node>> {
        let scanned = {
            let mut cache = self.children.lock().await;
            if populate || cache.subfolders.is_loaded() {
                let folders = self.fill_subfolders(ctx, &mut cache).await?;
                Some(folders.into_iter().find(|f| f.segment == name))
            } else {
                None
            }
        };

        let folder = match scanned {
            Some(hit) => hit,
            None => {
                debug!(folder_id = %self.id, segment = name, "Targeted subfolder lookup");
                let generation = ctx.generation().await;
                match ctx
                    .gateway()
                    .find_subfolder_by_name(self.id, name)
                    .await?
                {
                    Some(record) => Some(ctx.adopt_folder(record, generation).await),
                    None => None,
                }
            }
        };

        if let Some(folder) = folder {
            return Ok(Some(Node::Folder(folder)));
        }

        let document = ctx
            .gateway()
            .find_document_by_name(self.id, name)
            .await?;
        Ok(document.map(|record| Node::Document(Document::from_record(record))))
    }

    /// Create a subfolder.
    pub async fn create_folder(
        self: &Arc<Self>,
        ctx: &Repository,
        name: &str,
    ) -> AppResult<Arc<Folder>> {
        ctx.create_folder(self, name).await
    }

    /// Upload a new document into this folder.
    pub async fn create_document(
        self: &Arc<Self>,
        ctx: &Repository,
        name: &str,
        data: Bytes,
    ) -> AppResult<Document> {
        ctx.create_document(self, name, data).await
    }

    async fn load_subfolders(&self, ctx: &Repository) -> AppResult<Vec<Arc<Folder>>> {
        let mut cache = self.children.lock().await;
        self.fill_subfolders(ctx, &mut cache).await
    }

    async fn fill_subfolders(
        &self,
        ctx: &Repository,
        cache: &mut ChildCache,
    ) -> AppResult<Vec<Arc<Folder>>> {
        if let Some(folders) = cache.subfolders.get() {
            debug!(folder_id = %self.id, "Subfolder list cache hit");
            return Ok(folders.clone());
        }

        debug!(folder_id = %self.id, "Subfolder list cache miss");
        let generation = ctx.generation().await;
        let records = ctx.gateway().list_subfolders(self.id).await?;

        let mut folders = Vec::with_capacity(records.len());
        for record in records {
            folders.push(ctx.adopt_folder(record, generation).await);
        }

        cache.subfolders = LoadState::Loaded(folders.clone());
        Ok(folders)
    }
}
