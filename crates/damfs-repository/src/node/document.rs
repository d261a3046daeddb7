//! Document nodes.

use bytes::Bytes;
use tracing::debug;

use damfs_core::result::AppResult;
use damfs_core::traits::gateway::DocumentRecord;
use damfs_core::types::{DocumentId, FolderId, sanitize_segment};

use super::{Attributes, DISPLAY_NAME, time_value};
use crate::repository::Repository;

/// A document snapshot.
///
/// Documents are rebuilt from remote metadata on every resolution and are
/// never held by the repository's folder cache.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    folder_id: FolderId,
    segment: String,
    attributes: Attributes,
}

impl Document {
    /// Build a document from its remote record.
    pub fn from_record(record: DocumentRecord) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert(DISPLAY_NAME.to_string(), record.name.clone().into());
        attributes.insert("size".to_string(), record.size_bytes.into());
        if let Some(content_type) = record.content_type {
            attributes.insert("content_type".to_string(), content_type.into());
        }
        if let Some(owner) = record.owner {
            attributes.insert("owner".to_string(), owner.into());
        }
        if let Some(created) = time_value(record.created_at) {
            attributes.insert("created_at".to_string(), created);
        }
        if let Some(modified) = time_value(record.modified_at) {
            attributes.insert("modified_at".to_string(), modified);
        }

        Self {
            id: record.id,
            folder_id: record.folder_id,
            segment: sanitize_segment(&record.name),
            attributes,
        }
    }

    /// The document id.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The folder holding this document.
    pub fn folder_id(&self) -> FolderId {
        self.folder_id
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

    /// Content size in bytes.
    pub fn size(&self) -> u64 {
        self.attributes
            .get("size")
            .and_then(|v| v.as_u64())
            .unwrap_or(0)
    }

    /// MIME type, if known.
    pub fn content_type(&self) -> Option<&str> {
        self.attributes.get("content_type").and_then(|v| v.as_str())
    }

    /// Download the content.
    pub async fn read(&self, ctx: &Repository) -> AppResult<Bytes> {
        debug!(document_id = %self.id, "Downloading document content");
        ctx.gateway().read_document(self.id).await
    }
}
