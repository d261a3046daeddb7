//! Folder mutations.
//!
//! Every folder mutation ends with a full cache reset: a renamed or moved
//! folder changes the path of everything below it, and sibling names can
//! collide after sanitizing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use tracing::info;

use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::types::{DamPath, FolderId, NodeId, OverwriteMode, TimeKind, sanitize_segment};

use super::Repository;
use crate::node::{Folder, Node};

impl Repository {
    /// Create a subfolder of `parent`.
    pub async fn create_folder(
        &self,
        parent: &Arc<Folder>,
        name: &str,
    ) -> AppResult<Arc<Folder>> {
        self.ensure_writable("create folder")?;
        if name.trim().is_empty() {
            return Err(AppError::invalid_argument("Folder name cannot be empty"));
        }

        let segment = sanitize_segment(name);
        if parent.child_by_name(self, &segment, true).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "'{segment}' already exists in folder {}",
                parent.id()
            )));
        }

        let id = self.gateway.create_folder(parent.id(), name).await?;
        info!(folder_id = %id, parent_id = %parent.id(), name, "Folder created");

        parent.invalidate_child_cache().await;
        self.reset_caches().await;
        self.folder_by_id(id).await
    }

    /// Rename a folder in place.
    pub async fn rename_folder(
        &self,
        folder: &Arc<Folder>,
        new_name: &str,
    ) -> AppResult<Arc<Folder>> {
        self.ensure_writable("rename folder")?;
        if new_name.trim().is_empty() {
            return Err(AppError::invalid_argument("Folder name cannot be empty"));
        }
        let Some(parent_id) = folder.parent_id() else {
            return Err(AppError::not_supported("The root folder cannot be renamed"));
        };

        let parent = self.folder_by_id(parent_id).await?;
        let segment = sanitize_segment(new_name);
        if let Some(occupant) = parent.child_by_name(self, &segment, true).await? {
            if occupant.id() != NodeId::Folder(folder.id()) {
                return Err(AppError::already_exists(format!(
                    "'{segment}' already exists in folder {parent_id}"
                )));
            }
        }

        let stored = self.gateway.rename_folder(folder.id(), new_name).await?;
        info!(folder_id = %folder.id(), new_name = %stored, "Folder renamed");

        parent.invalidate_child_cache().await;
        self.reset_caches().await;
        self.folder_by_id(folder.id()).await
    }

    /// Move a folder under the folder at `target`.
    pub async fn move_folder(
        &self,
        folder: &Arc<Folder>,
        target: &DamPath,
        new_name: Option<&str>,
        mode: OverwriteMode,
    ) -> AppResult<Node> {
        self.ensure_writable("move folder")?;
        if folder.parent_id().is_none() {
            return Err(AppError::not_supported("The root folder cannot be moved"));
        }

        let destination = self.resolve_folder(target).await?;
        let name = new_name.unwrap_or(folder.display_name()).to_string();
        self.move_folder_into(Arc::clone(folder), destination, name, mode)
            .await
    }

    /// Copy a folder and everything below it under the folder at `target`.
    ///
    /// The remote has no folder copy, so this recreates the folder and
    /// clones each document.
    pub async fn copy_folder(
        &self,
        folder: &Arc<Folder>,
        target: &DamPath,
        new_name: Option<&str>,
        mode: OverwriteMode,
    ) -> AppResult<Node> {
        self.ensure_writable("copy folder")?;

        let destination = self.resolve_folder(target).await?;
        let name = new_name.unwrap_or(folder.display_name()).to_string();
        let copy = self
            .copy_folder_into(Arc::clone(folder), destination, name, mode)
            .await?;

        self.reset_caches().await;
        self.folder_by_id(copy.id()).await.map(Node::Folder)
    }

    /// Delete a folder and everything below it.
    pub async fn delete_folder(&self, folder: &Arc<Folder>) -> AppResult<()> {
        self.ensure_writable("delete folder")?;
        if folder.parent_id().is_none() || folder.id() == self.settings.root_folder_id {
            return Err(AppError::not_supported("The root folder cannot be deleted"));
        }

        self.gateway.delete_folder(folder.id()).await?;
        info!(folder_id = %folder.id(), "Folder deleted");

        self.invalidate_cached(folder.parent_id()).await;
        self.reset_caches().await;
        Ok(())
    }

    /// Folders have no settable timestamps on the remote.
    pub async fn set_folder_time(
        &self,
        folder: &Arc<Folder>,
        kind: TimeKind,
        _value: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_writable("set folder time")?;
        Err(AppError::not_supported(format!(
            "Setting the {kind} time of folder {} is not supported",
            folder.id()
        )))
    }

    /// Delete whatever node occupies a target name.
    pub(crate) async fn delete_node(&self, node: &Node) -> AppResult<()> {
        match node {
            Node::Folder(folder) => self.delete_folder(folder).await,
            Node::Document(document) => self.delete_document(document).await,
        }
    }

    /// Whether `ancestor` is `folder` or one of its ancestors.
    async fn is_within(&self, folder: &Arc<Folder>, ancestor: FolderId) -> AppResult<bool> {
        if folder.id() == ancestor {
            return Ok(true);
        }
        let mut cursor = folder.parent_id();
        while let Some(id) = cursor {
            if id == ancestor {
                return Ok(true);
            }
            if id == self.settings.root_folder_id {
                break;
            }
            cursor = self.folder_by_id(id).await?.parent_id();
        }
        Ok(false)
    }

    /// Refuse to replace `occupant` when deleting it would take the folder
    /// `holder` with it.
    pub(crate) async fn ensure_replaceable(
        &self,
        occupant: &Node,
        holder: FolderId,
    ) -> AppResult<()> {
        let Node::Folder(occupant) = occupant else {
            return Ok(());
        };
        let holder_folder = self.folder_by_id(holder).await?;
        if self.is_within(&holder_folder, occupant.id()).await? {
            return Err(AppError::invalid_argument(format!(
                "Folder {} cannot be replaced: it contains the source",
                occupant.id()
            )));
        }
        Ok(())
    }

    pub(crate) fn move_folder_into<'a>(
        &'a self,
        folder: Arc<Folder>,
        destination: Arc<Folder>,
        name: String,
        mode: OverwriteMode,
    ) -> BoxFuture<'a, AppResult<Node>> {
        async move {
            if self.is_within(&destination, folder.id()).await? {
                return Err(AppError::invalid_argument(format!(
                    "Folder {} cannot be moved into itself or a descendant",
                    folder.id()
                )));
            }

            let segment = sanitize_segment(&name);
            match destination.child_by_name(self, &segment, true).await? {
                Some(Node::Folder(occupant)) if occupant.id() == folder.id() => {
                    if occupant.display_name() == name {
                        return Ok(Node::Folder(occupant));
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
                        self.ensure_replaceable(&occupant, folder.id()).await?;
                        self.delete_node(&occupant).await?;
                    }
                    OverwriteMode::IntegrateIntoTarget => {
                        return match occupant {
                            Node::Folder(into) => self.integrate_folder(folder, into).await,
                            Node::Document(document) => Err(AppError::already_exists(format!(
                                "Cannot integrate folder {} into document {}",
                                folder.id(),
                                document.id()
                            ))),
                        };
                    }
                },
                None => {}
            }

            let source_parent = folder.parent_id();
            if source_parent != Some(destination.id()) {
                self.gateway.move_folder(folder.id(), destination.id()).await?;
            }
            if folder.display_name() != name {
                self.gateway.rename_folder(folder.id(), &name).await?;
            }
            info!(
                folder_id = %folder.id(),
                destination = %destination.id(),
                name = %name,
                "Folder moved"
            );

            if source_parent != Some(destination.id()) {
                self.invalidate_cached(source_parent).await;
            }
            destination.invalidate_child_cache().await;
            self.reset_caches().await;
            self.folder_by_id(folder.id()).await.map(Node::Folder)
        }
        .boxed()
    }

    /// Move every child of `source` into `into`, then delete `source`.
    ///
    /// `into` sees one child-cache invalidation per moved child. Deleting the
    /// emptied `source` invalidates the listing of `source`'s parent, so it
    /// counts against `into` only when `source` lived inside it. A sibling
    /// integration with one child therefore leaves `into` at 2, a nested one
    /// at 3.
    fn integrate_folder<'a>(
        &'a self,
        source: Arc<Folder>,
        into: Arc<Folder>,
    ) -> BoxFuture<'a, AppResult<Node>> {
        async move {
            info!(source = %source.id(), into = %into.id(), "Integrating folder");

            let subfolders = source.subfolders(self, 0, None).await?;
            let documents = source.documents(self, 0, None).await?;

            for child in subfolders {
                let name = child.display_name().to_string();
                self.move_folder_into(
                    child,
                    Arc::clone(&into),
                    name,
                    OverwriteMode::IntegrateIntoTarget,
                )
                .await?;
            }
            for document in documents {
                let name = document.display_name().to_string();
                self.move_document_into(
                    document,
                    Arc::clone(&into),
                    name,
                    OverwriteMode::IntegrateIntoTarget,
                )
                .await?;
            }

            self.gateway.delete_folder(source.id()).await?;
            info!(folder_id = %source.id(), "Integrated folder deleted");

            match source.parent_id() {
                Some(parent) if parent == into.id() => into.invalidate_child_cache().await,
                parent => self.invalidate_cached(parent).await,
            }
            self.reset_caches().await;
            self.folder_by_id(into.id()).await.map(Node::Folder)
        }
        .boxed()
    }

    fn copy_folder_into<'a>(
        &'a self,
        folder: Arc<Folder>,
        destination: Arc<Folder>,
        name: String,
        mode: OverwriteMode,
    ) -> BoxFuture<'a, AppResult<Arc<Folder>>> {
        async move {
            if self.is_within(&destination, folder.id()).await? {
                return Err(AppError::invalid_argument(format!(
                    "Folder {} cannot be copied into itself or a descendant",
                    folder.id()
                )));
            }

            let segment = sanitize_segment(&name);
            let copy = match destination.child_by_name(self, &segment, true).await? {
                None => self.create_folder(&destination, &name).await?,
                Some(occupant) => match mode {
                    OverwriteMode::None => {
                        return Err(AppError::already_exists(format!(
                            "'{segment}' already exists in folder {}",
                            destination.id()
                        )));
                    }
                    OverwriteMode::ReplaceTarget => {
                        self.ensure_replaceable(&occupant, folder.id()).await?;
                        self.delete_node(&occupant).await?;
                        self.create_folder(&destination, &name).await?
                    }
                    OverwriteMode::IntegrateIntoTarget => match occupant {
                        Node::Folder(existing) => existing,
                        Node::Document(document) => {
                            return Err(AppError::already_exists(format!(
                                "Cannot integrate folder {} into document {}",
                                folder.id(),
                                document.id()
                            )));
                        }
                    },
                },
            };

            let subfolders = folder.subfolders(self, 0, None).await?;
            let documents = folder.documents(self, 0, None).await?;

            for child in subfolders {
                let name = child.display_name().to_string();
                self.copy_folder_into(
                    child,
                    Arc::clone(&copy),
                    name,
                    OverwriteMode::IntegrateIntoTarget,
                )
                .await?;
            }
            for document in documents {
                let name = document.display_name().to_string();
                self.copy_document_into(
                    document,
                    Arc::clone(&copy),
                    name,
                    OverwriteMode::IntegrateIntoTarget,
                )
                .await?;
            }

            info!(source = %folder.id(), copy = %copy.id(), "Folder copied");
            Ok(copy)
        }
        .boxed()
    }
}
