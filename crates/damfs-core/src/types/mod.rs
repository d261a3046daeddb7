//! Shared value types: paths, typed identifiers, names, and operation modes.

pub mod id;
pub mod mode;
pub mod name;
pub mod path;

pub use id::{DocumentId, FolderId, NodeId};
pub use mode::{OverwriteMode, TimeKind};
pub use name::sanitize_segment;
pub use path::DamPath;
