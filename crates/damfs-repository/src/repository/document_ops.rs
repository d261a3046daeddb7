//! Document mutations.
//!
//! Document changes only invalidate the child caches of the folders they
//! touch; the path and id indices stay intact.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::gateway::CloneTarget;
use damfs_core::types::{DamPath, NodeId, OverwriteMode, TimeKind, sanitize_segment};

use super::Repository;
use crate::node::{Document, Folder, Node};

impl Repository {
    /// Upload a new document into `parent`.
    pub async fn create_document(
        &self,
        parent: &Arc<Folder>,
        name: &str,
        data: Bytes,
    ) -> AppResult<Document> {
        self.ensure_writable("create document")?;
        if name.trim().is_empty() {
            return Err(AppError::invalid_argument("Document name cannot be empty"));
        }

        let segment = sanitize_segment(name);
        if parent.child_by_name(self, &segment, true).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "'{segment}' already exists in folder {}",
                parent.id()
            )));
        }

        let size = data.len();
        let id = self.gateway.create_document(parent.id(), name, data).await?;
        info!(document_id = %id, parent_id = %parent.id(), name, size, "Document created");

        parent.invalidate_child_cache().await;
        self.document_by_id(id).await
    }

    /// Rename a document within its folder.
    pub async fn rename_document(&self, document: &Document, new_name: &str) -> AppResult<Document> {
        self.ensure_writable("rename document")?;
        if new_name.trim().is_empty() {
            return Err(AppError::invalid_argument("Document name cannot be empty"));
        }

        let parent = self.folder_by_id(document.folder_id()).await?;
        let segment = sanitize_segment(new_name);
        if let Some(occupant) = parent.child_by_name(self, &segment, true).await? {
            if occupant.id() != NodeId::Document(document.id()) {
                return Err(AppError::already_exists(format!(
                    "'{segment}' already exists in folder {}",
                    parent.id()
                )));
            }
        }

        self.gateway.rename_document(document.id(), new_name).await?;
        info!(document_id = %document.id(), new_name, "Document renamed");

        parent.invalidate_child_cache().await;
        self.document_by_id(document.id()).await
    }

    /// Move a document under the folder at `target`.
    pub async fn move_document(
        &self,
        document: &Document,
        target: &DamPath,
        new_name: Option<&str>,
        mode: OverwriteMode,
    ) -> AppResult<Node> {
        self.ensure_writable("move document")?;

        let destination = self.resolve_folder(target).await?;
        let name = new_name.unwrap_or(document.display_name()).to_string();
        self.move_document_into(document.clone(), destination, name, mode)
            .await
    }

    /// Copy a document under the folder at `target`.
    pub async fn copy_document(
        &self,
        document: &Document,
        target: &DamPath,
        new_name: Option<&str>,
        mode: OverwriteMode,
    ) -> AppResult<Node> {
        self.ensure_writable("copy document")?;

        let destination = self.resolve_folder(target).await?;
        let name = new_name.unwrap_or(document.display_name()).to_string();
        self.copy_document_into(document.clone(), destination, name, mode)
            .await
            .map(Node::Document)
    }

    /// Delete a document.
    pub async fn delete_document(&self, document: &Document) -> AppResult<()> {
        self.ensure_writable("delete document")?;

        self.gateway.delete_document(document.id()).await?;
        info!(document_id = %document.id(), "Document deleted");

        self.invalidate_cached(Some(document.folder_id())).await;
        Ok(())
    }

    /// Set one of a document's timestamps.
    pub async fn set_document_time(
        &self,
        document: &Document,
        kind: TimeKind,
        value: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_writable("set document time")?;

        self.gateway
            .set_document_timestamp(document.id(), kind, value)
            .await?;
        info!(document_id = %document.id(), %kind, %value, "Document time set");
        Ok(())
    }

    pub(crate) fn move_document_into<'a>(
        &'a self,
        document: Document,
        destination: Arc<Folder>,
        name: String,
        mode: OverwriteMode,
    ) -> BoxFuture<'a, AppResult<Node>> {
        async move {
            let segment = sanitize_segment(&name);
            match destination.child_by_name(self, &segment, true).await? {
                Some(Node::Document(occupant)) if occupant.id() == document.id() => {
                    if occupant.display_name() == name {
                        return Ok(Node::Document(occupant));
                    }
                }
                Some(occupant) => match mode {
                    OverwriteMode::None => {
                        return Err(AppError::already_exists(format!(
                            "'{segment}' already exists in folder {}",
                            destination.id()
                        )));
                    }
                    OverwriteMode::ReplaceTarget => {
                        self.ensure_replaceable(&occupant, document.folder_id())
                            .await?;
                        self.delete_node(&occupant).await?;
                    }
                    OverwriteMode::IntegrateIntoTarget => {
                        return match occupant {
                            Node::Document(into) => {
                                self.clone_into_document(&document, &into, &destination)
                                    .await?;
                                self.delete_document(&document).await?;
                                self.document_by_id(into.id()).await.map(Node::Document)
                            }
                            Node::Folder(into) => {
                                let name = document.display_name().to_string();
                                self.move_document_into(document, into, name, mode).await
                            }
                        };
                    }
                },
                None => {}
            }

            let source_parent = document.folder_id();
            let new_parent = (source_parent != destination.id()).then(|| destination.id());
            let new_name = (document.display_name() != name).then_some(name.as_str());
            self.gateway
                .update_document(document.id(), new_parent, new_name)
                .await?;
            info!(
                document_id = %document.id(),
                destination = %destination.id(),
                name = %name,
                "Document moved"
            );

            if new_parent.is_some() {
                self.invalidate_cached(Some(source_parent)).await;
            }
            destination.invalidate_child_cache().await;
            self.document_by_id(document.id()).await.map(Node::Document)
        }
        .boxed()
    }

    pub(crate) fn copy_document_into<'a>(
        &'a self,
        document: Document,
        destination: Arc<Folder>,
        name: String,
        mode: OverwriteMode,
    ) -> BoxFuture<'a, AppResult<Document>> {
        async move {
            let segment = sanitize_segment(&name);
            match destination.child_by_name(self, &segment, true).await? {
                None => {}
                Some(occupant) => match (mode, occupant) {
                    (OverwriteMode::None, _) => {
                        return Err(AppError::already_exists(format!(
                            "'{segment}' already exists in folder {}",
                            destination.id()
                        )));
                    }
                    (OverwriteMode::ReplaceTarget, Node::Document(into))
                        if into.id() == document.id() =>
                    {
                        return Err(AppError::invalid_argument(format!(
                            "Document {} cannot replace itself",
                            document.id()
                        )));
                    }
                    (OverwriteMode::ReplaceTarget, occupant) => {
                        self.ensure_replaceable(&occupant, document.folder_id())
                            .await?;
                        self.delete_node(&occupant).await?;
                    }
                    (OverwriteMode::IntegrateIntoTarget, Node::Document(into)) => {
                        if into.id() == document.id() {
                            return Ok(into);
                        }
                        self.clone_into_document(&document, &into, &destination)
                            .await?;
                        return self.document_by_id(into.id()).await;
                    }
                    (OverwriteMode::IntegrateIntoTarget, Node::Folder(into)) => {
                        let name = document.display_name().to_string();
                        return self.copy_document_into(document, into, name, mode).await;
                    }
                },
            }

            let copy = self
                .gateway
                .clone_document(
                    document.id(),
                    CloneTarget {
                        document: None,
                        parent: Some(destination.id()),
                        name: Some(name.clone()),
                    },
                )
                .await?;
            info!(source = %document.id(), copy = %copy, name = %name, "Document copied");

            destination.invalidate_child_cache().await;
            self.document_by_id(copy).await
        }
        .boxed()
    }

    /// Overwrite `into`'s data with `source`'s.
    async fn clone_into_document(
        &self,
        source: &Document,
        into: &Document,
        parent: &Arc<Folder>,
    ) -> AppResult<()> {
        self.gateway
            .clone_document(
                source.id(),
                CloneTarget {
                    document: Some(into.id()),
                    parent: None,
                    name: None,
                },
            )
            .await?;
        info!(source = %source.id(), into = %into.id(), "Document data cloned");

        parent.invalidate_child_cache().await;
        Ok(())
    }
}
