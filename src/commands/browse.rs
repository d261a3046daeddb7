//! Read-only commands: stat, ls, tree, cat.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use damfs_core::error::AppError;
use damfs_core::types::DamPath;
use damfs_fs::{DirEntry, EntryKind};
use damfs_repository::{Folder, Node};

use crate::output::{self, OutputFormat};
use crate::session::Session;

/// Arguments for `stat`
#[derive(Debug, Args)]
pub struct StatArgs {
    /// Path of the node
    pub path: String,
}

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Folder path
    #[arg(default_value = "/")]
    pub path: String,
    /// Skip this many entries
    #[arg(long, default_value = "0")]
    pub offset: usize,
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `tree`
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Folder path
    #[arg(default_value = "/")]
    pub path: String,
    /// Max depth
    #[arg(short, long, default_value = "3")]
    pub depth: usize,
}

/// Arguments for `cat`
#[derive(Debug, Args)]
pub struct CatArgs {
    /// Document path
    pub path: String,
}

/// Entry display row
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Node id
    id: String,
    /// Path segment
    name: String,
    /// Folder or document
    kind: String,
    /// Size in bytes
    size: String,
    /// Last modified
    modified: String,
}

impl From<DirEntry> for EntryRow {
    fn from(entry: DirEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            kind: match entry.kind {
                EntryKind::Folder => "folder".to_string(),
                EntryKind::Document => "document".to_string(),
            },
            size: entry.size.map(|s| s.to_string()).unwrap_or_default(),
            modified: entry.modified.unwrap_or_default(),
        }
    }
}

/// Tree display row
#[derive(Debug, Serialize, Tabled)]
struct TreeRow {
    /// Full path
    path: String,
    /// Node id
    id: String,
    /// Size in bytes
    size: String,
}

/// Show one node.
pub async fn stat(session: &Session, args: &StatArgs, format: OutputFormat) -> Result<(), AppError> {
    let entry = session.fs.stat(&DamPath::parse(&args.path)).await?;
    output::print_item(&EntryRow::from(entry), format);
    Ok(())
}

/// List a folder.
pub async fn ls(session: &Session, args: &LsArgs, format: OutputFormat) -> Result<(), AppError> {
    let entries = session
        .fs
        .list(&DamPath::parse(&args.path), args.offset, args.limit)
        .await?;
    let rows: Vec<EntryRow> = entries.into_iter().map(EntryRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Walk a folder depth-first, down to `args.depth` levels.
pub async fn tree(session: &Session, args: &TreeArgs, format: OutputFormat) -> Result<(), AppError> {
    let start = DamPath::parse(&args.path);
    let folder = session.repository.resolve_folder(&start).await?;

    let mut rows = Vec::new();
    let mut stack: Vec<(Arc<Folder>, DamPath, usize)> = vec![(folder, start, 0)];
    while let Some((folder, path, depth)) = stack.pop() {
        rows.push(TreeRow {
            path: path.to_string(),
            id: folder.id().to_string(),
            size: String::new(),
        });
        if depth >= args.depth {
            continue;
        }

        let children = folder.children(&session.repository, 0, None).await?;
        let mut subfolders = Vec::new();
        for child in children {
            let child_path = path.append(child.path_segment());
            match child {
                Node::Folder(sub) => subfolders.push((sub, child_path, depth + 1)),
                Node::Document(document) => rows.push(TreeRow {
                    path: child_path.to_string(),
                    id: document.id().to_string(),
                    size: document.size().to_string(),
                }),
            }
        }
        stack.extend(subfolders.into_iter().rev());
    }

    output::print_list(&rows, format);
    Ok(())
}

/// Print a document's content to stdout.
pub async fn cat(session: &Session, args: &CatArgs) -> Result<(), AppError> {
    let content = session.fs.read(&DamPath::parse(&args.path)).await?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&content)?;
    stdout.flush()?;
    Ok(())
}
