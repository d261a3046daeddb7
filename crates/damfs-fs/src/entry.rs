//! Directory entries returned by the adapter.

use serde::Serialize;

use damfs_repository::Node;

/// Whether an entry is a folder or a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A folder.
    Folder,
    /// A document.
    Document,
}

/// One row of a listing or a `stat` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirEntry {
    /// Node id string.
    pub id: String,
    /// Path segment.
    pub name: String,
    /// Raw display name.
    pub display_name: String,
    /// Folder or document.
    pub kind: EntryKind,
    /// Content size; `None` for folders.
    pub size: Option<u64>,
    /// Last modification time (RFC 3339), falling back to creation time.
    pub modified: Option<String>,
}

impl From<&Node> for DirEntry {
    fn from(node: &Node) -> Self {
        let timestamp = |key: &str| {
            node.attribute(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        let (kind, size) = match node {
            Node::Folder(_) => (EntryKind::Folder, None),
            Node::Document(document) => (EntryKind::Document, Some(document.size())),
        };

        Self {
            id: node.id().to_string(),
            name: node.path_segment().to_string(),
            display_name: node.display_name().to_string(),
            kind,
            size,
            modified: timestamp("modified_at").or_else(|| timestamp("created_at")),
        }
    }
}
