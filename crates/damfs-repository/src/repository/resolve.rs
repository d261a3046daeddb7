//! Path resolution.

use std::sync::Arc;

use tracing::debug;

use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::types::DamPath;

use super::Repository;
use crate::node::{Folder, Node};

impl Repository {
    /// Resolve a path to a folder or document.
    ///
    /// A cached path returns without remote calls. Otherwise the walk
    /// resumes at the deepest cached ancestor (the root if none) and looks
    /// up one segment at a time. The first segment of the walk uses a single
    /// targeted query; deeper segments fill and cache their parent's
    /// subfolder list. Every folder passed on the way is bound to its path.
    pub async fn resolve(&self, path: &DamPath) -> AppResult<Node> {
        if path.is_root() {
            return self.root().await.map(Node::Folder);
        }

        let key = path.to_string();
        let generation = {
            let index = self.index.read().await;
            if let Some(folder) = index.by_path(&key) {
                debug!(path = %key, "Path cache hit");
                return Ok(Node::Folder(folder));
            }
            index.generation()
        };

        let (mut current, start) = self.resume_point(path).await?;
        debug!(path = %key, resume_depth = start, "Resolving path");

        let segments = path.segments();
        let last = segments.len() - 1;
        for (depth, segment) in segments.iter().enumerate().skip(start) {
            let populate = depth != start;
            match current.child_by_name(self, segment, populate).await? {
                Some(Node::Folder(folder)) => {
                    let resolved = path.sub_path(depth as isize + 1);
                    current = self.bind_path(&resolved, folder, generation).await;
                }
                Some(Node::Document(document)) if depth == last => {
                    return Ok(Node::Document(document));
                }
                Some(Node::Document(_)) => {
                    return Err(AppError::not_found(format!(
                        "{path} does not exist: {} is a document",
                        path.sub_path(depth as isize + 1)
                    )));
                }
                None => {
                    return Err(AppError::not_found(format!("{path} does not exist")));
                }
            }
        }

        Ok(Node::Folder(current))
    }

    /// Resolve a path that must name a folder.
    pub async fn resolve_folder(&self, path: &DamPath) -> AppResult<Arc<Folder>> {
        match self.resolve(path).await? {
            Node::Folder(folder) => Ok(folder),
            Node::Document(_) => Err(AppError::invalid_argument(format!(
                "{path} is a document, not a folder"
            ))),
        }
    }

    /// Whether a path resolves. Only `NotFound` counts as absence.
    pub async fn exists(&self, path: &DamPath) -> AppResult<bool> {
        match self.resolve(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// The deepest cached proper ancestor of `path` and its depth.
    async fn resume_point(&self, path: &DamPath) -> AppResult<(Arc<Folder>, usize)> {
        {
            let index = self.index.read().await;
            for depth in (1..path.len()).rev() {
                let ancestor = path.sub_path(depth as isize).to_string();
                if let Some(folder) = index.by_path(&ancestor) {
                    return Ok((folder, depth));
                }
            }
        }
        Ok((self.root().await?, 0))
    }
}
