//! Folder and document tables behind the in-memory gateway.

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::Utc;

use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::gateway::{DocumentRecord, FolderRecord};
use damfs_core::types::{DocumentId, FolderId, sanitize_segment};

/// A document and its content.
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub(crate) record: DocumentRecord,
    pub(crate) content: Bytes,
}

/// The whole remote tree. Listings come back in id order, which is
/// creation order.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    pub(crate) root_id: FolderId,
    pub(crate) folders: BTreeMap<FolderId, FolderRecord>,
    pub(crate) documents: BTreeMap<DocumentId, StoredDocument>,
    pub(crate) next_id: u64,
}

impl Tree {
    /// A tree holding only the root folder.
    pub(crate) fn new(root_id: FolderId, root_name: &str) -> Self {
        let mut folders = BTreeMap::new();
        folders.insert(
            root_id,
            FolderRecord {
                id: root_id,
                parent_id: None,
                name: root_name.to_string(),
                created_at: Some(Utc::now()),
                owner: None,
            },
        );
        Self {
            root_id,
            folders,
            documents: BTreeMap::new(),
            next_id: root_id.get() + 1,
        }
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn folder(&self, id: FolderId) -> AppResult<&FolderRecord> {
        self.folders
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} does not exist")))
    }

    pub(crate) fn document(&self, id: DocumentId) -> AppResult<&StoredDocument> {
        self.documents
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} does not exist")))
    }

    fn document_mut(&mut self, id: DocumentId) -> AppResult<&mut StoredDocument> {
        self.documents
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Document {id} does not exist")))
    }

    pub(crate) fn subfolders(&self, parent: FolderId) -> impl Iterator<Item = &FolderRecord> {
        self.folders
            .values()
            .filter(move |f| f.parent_id == Some(parent))
    }

    pub(crate) fn documents_in(&self, parent: FolderId) -> impl Iterator<Item = &StoredDocument> {
        self.documents
            .values()
            .filter(move |d| d.record.folder_id == parent)
    }

    pub(crate) fn subfolder_named(&self, parent: FolderId, segment: &str) -> Option<&FolderRecord> {
        self.subfolders(parent)
            .find(|f| sanitize_segment(&f.name) == segment)
    }

    pub(crate) fn document_named(&self, parent: FolderId, segment: &str) -> Option<&StoredDocument> {
        self.documents_in(parent)
            .find(|d| sanitize_segment(&d.record.name) == segment)
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub(crate) fn is_within(&self, id: FolderId, ancestor: FolderId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.folders.get(&current).and_then(|f| f.parent_id);
        }
        false
    }

    pub(crate) fn insert_folder(&mut self, parent: FolderId, name: &str) -> AppResult<FolderId> {
        self.folder(parent)?;
        let id = FolderId(self.allocate());
        self.folders.insert(
            id,
            FolderRecord {
                id,
                parent_id: Some(parent),
                name: name.to_string(),
                created_at: Some(Utc::now()),
                owner: None,
            },
        );
        Ok(id)
    }

    pub(crate) fn insert_document(
        &mut self,
        parent: FolderId,
        name: &str,
        content: Bytes,
    ) -> AppResult<DocumentId> {
        self.folder(parent)?;
        let id = DocumentId(self.allocate());
        let now = Utc::now();
        let content_type = mime_guess::from_path(name)
            .first()
            .map(|mime| mime.to_string());
        self.documents.insert(
            id,
            StoredDocument {
                record: DocumentRecord {
                    id,
                    folder_id: parent,
                    name: name.to_string(),
                    content_type,
                    size_bytes: content.len() as u64,
                    created_at: Some(now),
                    modified_at: Some(now),
                    owner: None,
                },
                content,
            },
        );
        Ok(id)
    }

    pub(crate) fn rename_folder(&mut self, id: FolderId, name: &str) -> AppResult<String> {
        let folder = self
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} does not exist")))?;
        folder.name = name.to_string();
        Ok(folder.name.clone())
    }

    pub(crate) fn move_folder(&mut self, id: FolderId, new_parent: FolderId) -> AppResult<String> {
        self.folder(new_parent)?;
        if id == self.root_id {
            return Err(AppError::remote_message(
                "move_folder",
                id,
                "the root folder cannot be moved",
            ));
        }
        if self.is_within(new_parent, id) {
            return Err(AppError::remote_message(
                "move_folder",
                id,
                "a folder cannot be moved below itself",
            ));
        }
        let folder = self
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} does not exist")))?;
        folder.parent_id = Some(new_parent);
        Ok(folder.name.clone())
    }

    pub(crate) fn update_document(
        &mut self,
        id: DocumentId,
        new_parent: Option<FolderId>,
        new_name: Option<&str>,
    ) -> AppResult<()> {
        if let Some(parent) = new_parent {
            self.folder(parent)?;
        }
        let stored = self.document_mut(id)?;
        if let Some(parent) = new_parent {
            stored.record.folder_id = parent;
        }
        if let Some(name) = new_name {
            stored.record.name = name.to_string();
        }
        stored.record.modified_at = Some(Utc::now());
        Ok(())
    }

    /// Overwrite `target`'s content with `source`'s.
    pub(crate) fn overwrite_document(
        &mut self,
        source: DocumentId,
        target: DocumentId,
    ) -> AppResult<()> {
        let (content, content_type) = {
            let stored = self.document(source)?;
            (stored.content.clone(), stored.record.content_type.clone())
        };
        let stored = self.document_mut(target)?;
        stored.record.size_bytes = content.len() as u64;
        stored.record.content_type = content_type;
        stored.record.modified_at = Some(Utc::now());
        stored.content = content;
        Ok(())
    }

    /// Remove a folder with everything below it.
    pub(crate) fn remove_folder(&mut self, id: FolderId) -> AppResult<()> {
        self.folder(id)?;
        if id == self.root_id {
            return Err(AppError::remote_message(
                "delete_folder",
                id,
                "the root folder cannot be deleted",
            ));
        }

        let doomed: Vec<FolderId> = self
            .folders
            .keys()
            .copied()
            .filter(|folder| self.is_within(*folder, id))
            .collect();
        self.documents
            .retain(|_, d| !doomed.contains(&d.record.folder_id));
        for folder in doomed {
            self.folders.remove(&folder);
        }
        Ok(())
    }

    pub(crate) fn remove_document(&mut self, id: DocumentId) -> AppResult<()> {
        self.documents
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Document {id} does not exist")))
    }

    pub(crate) fn document_mut_record(&mut self, id: DocumentId) -> AppResult<&mut DocumentRecord> {
        self.document_mut(id).map(|stored| &mut stored.record)
    }
}
