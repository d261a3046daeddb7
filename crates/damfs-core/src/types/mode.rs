//! Overwrite policies and timestamp kinds accepted by node operations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// What a move or copy does when the target name is already occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverwriteMode {
    /// Fail with `AlreadyExists`.
    #[default]
    None,
    /// Delete whatever occupies the target, then take its place.
    ReplaceTarget,
    /// Merge into the occupant: move children into a folder, or clone data
    /// into a document.
    IntegrateIntoTarget,
}

impl fmt::Display for OverwriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::ReplaceTarget => write!(f, "replace-target"),
            Self::IntegrateIntoTarget => write!(f, "integrate-into-target"),
        }
    }
}

impl FromStr for OverwriteMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "replace-target" => Ok(Self::ReplaceTarget),
            "integrate-into-target" => Ok(Self::IntegrateIntoTarget),
            other => Err(AppError::invalid_argument(format!(
                "Unknown overwrite mode '{other}'"
            ))),
        }
    }
}

/// Which document timestamp `set_time` updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeKind {
    /// Creation time.
    Created,
    /// Last modification time.
    Modified,
}

impl TimeKind {
    /// Attribute key under which nodes expose this timestamp.
    pub fn attribute_key(self) -> &'static str {
        match self {
            Self::Created => "created_at",
            Self::Modified => "modified_at",
        }
    }
}

impl fmt::Display for TimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

impl FromStr for TimeKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" | "ctime" => Ok(Self::Created),
            "modified" | "mtime" => Ok(Self::Modified),
            other => Err(AppError::invalid_argument(format!(
                "Unknown timestamp kind '{other}'"
            ))),
        }
    }
}
