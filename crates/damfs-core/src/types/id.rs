//! Newtype wrappers around the remote's numeric identifiers.
//!
//! Folders (categories) and documents (media) live in separate numeric id
//! spaces on the remote. A node id string tells them apart: decimal digits
//! for a folder, `d` followed by digits for a document.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Macro to define a newtype ID wrapper around `u64`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Return the inner numeric value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

define_id!(
    /// Identifier of a remote folder (category).
    FolderId
);

define_id!(
    /// Identifier of a remote document (medium).
    DocumentId
);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// A node id of either variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// A folder id, rendered as plain digits.
    Folder(FolderId),
    /// A document id, rendered as `d<digits>`.
    Document(DocumentId),
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(id) => id.fmt(f),
            Self::Document(id) => id.fmt(f),
        }
    }
}

impl FromStr for NodeId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, is_document) = match s.strip_prefix('d') {
            Some(rest) => (rest, true),
            None => (s, false),
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::invalid_argument(format!("Malformed node id '{s}'")));
        }

        let value: u64 = digits
            .parse()
            .map_err(|_| AppError::invalid_argument(format!("Node id '{s}' is out of range")))?;

        Ok(if is_document {
            Self::Document(DocumentId(value))
        } else {
            Self::Folder(FolderId(value))
        })
    }
}

impl From<FolderId> for NodeId {
    fn from(id: FolderId) -> Self {
        Self::Folder(id)
    }
}

impl From<DocumentId> for NodeId {
    fn from(id: DocumentId) -> Self {
        Self::Document(id)
    }
}
