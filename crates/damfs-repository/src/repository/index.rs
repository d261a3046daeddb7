//! The folder arena and its two indices.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use damfs_core::traits::gateway::FolderRecord;
use damfs_core::types::FolderId;

use crate::node::Folder;

/// Stable handle of a folder inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct FolderHandle(u64);

/// Sizes of the repository caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Folder instances in the arena.
    pub folders: usize,
    /// Paths bound to folders.
    pub paths: usize,
    /// Raw folder records kept for rebuilding folders without a remote call.
    pub records: usize,
    /// Number of full resets so far.
    pub generation: u64,
}

/// Owns every cached folder; the id and path maps only hold handles.
///
/// Invariant: every handle in `by_path` is also the value of `by_id` for
/// the folder's id, so both indices always yield the same instance.
#[derive(Debug, Default)]
pub(crate) struct FolderIndex {
    arena: HashMap<FolderHandle, Arc<Folder>>,
    by_id: HashMap<FolderId, FolderHandle>,
    by_path: HashMap<String, FolderHandle>,
    categories: HashMap<FolderId, FolderRecord>,
    next_handle: u64,
    generation: u64,
}

impl FolderIndex {
    /// Counter bumped on every [`clear`](Self::clear). Work that started
    /// under an older generation must not write into the index.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn by_id(&self, id: FolderId) -> Option<Arc<Folder>> {
        self.by_id
            .get(&id)
            .and_then(|handle| self.arena.get(handle))
            .cloned()
    }

    pub(crate) fn by_path(&self, path: &str) -> Option<Arc<Folder>> {
        self.by_path
            .get(path)
            .and_then(|handle| self.arena.get(handle))
            .cloned()
    }

    pub(crate) fn record(&self, id: FolderId) -> Option<FolderRecord> {
        self.categories.get(&id).cloned()
    }

    /// Register a folder built from `record`, or return the instance already
    /// registered for its id.
    ///
    /// When `generation` is stale the record is not stored and the returned
    /// folder is detached from the index.
    pub(crate) fn adopt(&mut self, record: FolderRecord, generation: u64) -> Arc<Folder> {
        if generation != self.generation {
            return Arc::new(Folder::from_record(record));
        }
        if let Some(existing) = self.by_id(record.id) {
            return existing;
        }

        let folder = Arc::new(Folder::from_record(record.clone()));
        self.categories.insert(record.id, record);
        self.insert(Arc::clone(&folder));
        folder
    }

    /// Bind `path` to `folder` and return the canonical instance for its id.
    pub(crate) fn bind_path(
        &mut self,
        path: String,
        folder: Arc<Folder>,
        generation: u64,
    ) -> Arc<Folder> {
        if generation != self.generation {
            return folder;
        }

        let registered = self
            .by_id
            .get(&folder.id())
            .and_then(|handle| self.arena.get(handle).map(|f| (*handle, Arc::clone(f))));

        let (handle, canonical) = match registered {
            Some(found) => found,
            None => (self.insert(Arc::clone(&folder)), folder),
        };
        self.by_path.insert(path, handle);
        canonical
    }

    /// Drop every folder, path, and record, and start a new generation.
    pub(crate) fn clear(&mut self) {
        self.arena.clear();
        self.by_id.clear();
        self.by_path.clear();
        self.categories.clear();
        self.generation += 1;
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            folders: self.arena.len(),
            paths: self.by_path.len(),
            records: self.categories.len(),
            generation: self.generation,
        }
    }

    fn insert(&mut self, folder: Arc<Folder>) -> FolderHandle {
        let handle = FolderHandle(self.next_handle);
        self.next_handle += 1;
        self.by_id.insert(folder.id(), handle);
        self.arena.insert(handle, folder);
        handle
    }
}
