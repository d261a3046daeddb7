//! Mutating commands: mkdir, put, rename, mv, cp, rm, touch.

use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use clap::Args;

use damfs_core::error::AppError;
use damfs_core::types::{DamPath, OverwriteMode, TimeKind};
use damfs_repository::Node;

use crate::output;
use crate::session::Session;

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Path of the new folder
    pub path: String,
}

/// Arguments for `put`
#[derive(Debug, Args)]
pub struct PutArgs {
    /// Local file to upload
    pub source: PathBuf,
    /// Path of the new document
    pub path: String,
}

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Path of the node
    pub path: String,
    /// New display name
    pub new_name: String,
}

/// Arguments for `mv` and `cp`
#[derive(Debug, Args)]
pub struct TransferArgs {
    /// Path of the node
    pub source: String,
    /// Destination parent folder
    pub target: String,
    /// Name at the destination (defaults to the current name)
    #[arg(short, long)]
    pub name: Option<String>,
    /// What to do when the name is taken: none, replace-target,
    /// integrate-into-target
    #[arg(short, long, default_value = "none")]
    pub overwrite: OverwriteMode,
}

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Path of the node
    pub path: String,
}

/// Arguments for `touch`
#[derive(Debug, Args)]
pub struct TouchArgs {
    /// Document path
    pub path: String,
    /// Timestamp to set: created or modified
    #[arg(short, long, default_value = "modified")]
    pub kind: TimeKind,
    /// RFC 3339 time (defaults to now)
    #[arg(short, long)]
    pub time: Option<DateTime<Utc>>,
}

/// Which transfer `mv`/`cp` performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Move the node
    Move,
    /// Copy the node
    Copy,
}

/// Create a folder.
pub async fn mkdir(session: &Session, args: &MkdirArgs) -> Result<(), AppError> {
    let path = DamPath::parse(&args.path);
    if path.is_root() {
        return Err(AppError::already_exists("/ already exists"));
    }

    let parent = session.repository.resolve_folder(&path.parent()).await?;
    let folder = parent
        .create_folder(&session.repository, path.basename())
        .await?;
    output::print_success(&format!("Created folder {} ({})", path, folder.id()));
    Ok(())
}

/// Upload a local file.
pub async fn put(session: &Session, args: &PutArgs) -> Result<(), AppError> {
    let path = DamPath::parse(&args.path);
    if path.is_root() {
        return Err(AppError::invalid_argument("A document path needs a name"));
    }

    let data = tokio::fs::read(&args.source).await?;
    let parent = session.repository.resolve_folder(&path.parent()).await?;
    let document = parent
        .create_document(&session.repository, path.basename(), Bytes::from(data))
        .await?;
    session.fs.forget(&path).await?;
    output::print_success(&format!(
        "Uploaded {} ({}, {} bytes)",
        path,
        document.id(),
        document.size()
    ));
    Ok(())
}

/// Rename a node in place.
pub async fn rename(session: &Session, args: &RenameArgs) -> Result<(), AppError> {
    let path = DamPath::parse(&args.path);
    let node = session.repository.resolve(&path).await?;
    let renamed = node.rename(&session.repository, &args.new_name).await?;

    forget(session, &node, &path).await?;
    let new_path = path.parent().append(renamed.path_segment());
    output::print_success(&format!("Renamed {path} to {new_path}"));
    Ok(())
}

/// Move or copy a node under another folder.
pub async fn transfer(
    session: &Session,
    args: &TransferArgs,
    transfer: Transfer,
) -> Result<(), AppError> {
    let source = DamPath::parse(&args.source);
    let target = DamPath::parse(&args.target);
    let node = session.repository.resolve(&source).await?;
    let name = args.name.as_deref();

    let result = match transfer {
        Transfer::Move => {
            let moved = node
                .move_to(&session.repository, &target, name, args.overwrite)
                .await?;
            forget(session, &node, &source).await?;
            moved
        }
        Transfer::Copy => {
            node.copy_to(&session.repository, &target, name, args.overwrite)
                .await?
        }
    };

    let landed = session.repository.path_of(&result).await?;
    session.fs.forget(&landed).await?;
    let verb = match transfer {
        Transfer::Move => "Moved",
        Transfer::Copy => "Copied",
    };
    output::print_success(&format!("{verb} {source} to {landed}"));
    Ok(())
}

/// Delete a node.
pub async fn rm(session: &Session, args: &RmArgs) -> Result<(), AppError> {
    let path = DamPath::parse(&args.path);
    let node = session.repository.resolve(&path).await?;
    node.delete(&session.repository).await?;

    forget(session, &node, &path).await?;
    output::print_success(&format!("Deleted {path}"));
    Ok(())
}

/// Set a document timestamp.
pub async fn touch(session: &Session, args: &TouchArgs) -> Result<(), AppError> {
    let path = DamPath::parse(&args.path);
    let node = session.repository.resolve(&path).await?;
    let value = args.time.unwrap_or_else(Utc::now);
    node.set_time(&session.repository, args.kind, value).await?;

    session.fs.forget(&path).await?;
    output::print_success(&format!("Set {} time of {path} to {}", args.kind, value.to_rfc3339()));
    Ok(())
}

/// Drop memoized documents a change to `node` at `path` may have made stale.
/// A folder change moves every document below it, so everything goes.
async fn forget(session: &Session, node: &Node, path: &DamPath) -> Result<(), AppError> {
    match node {
        Node::Folder(_) => session.fs.forget_all().await,
        Node::Document(_) => session.fs.forget(path).await,
    }
}
