//! Slash-separated repository paths.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ordered sequence of path segments.
///
/// Parsing never fails: leading, trailing, and doubled slashes are dropped,
/// so the root is the path with no segments and renders as `/`. All
/// operations return new values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DamPath {
    segments: Vec<String>,
}

impl DamPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a slash-separated string.
    pub fn parse(s: &str) -> Self {
        let segments = s
            .trim_matches('/')
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    /// Build a path from already-split segments, dropping empty ones.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(Into::into)
            .filter(|segment: &String| !segment.is_empty())
            .collect();
        Self { segments }
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segments in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// A new path with one more trailing segment.
    ///
    /// An empty segment leaves the path unchanged.
    pub fn append(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        if !segment.is_empty() {
            segments.push(segment.to_string());
        }
        Self { segments }
    }

    /// The first `n` segments for `n >= 0`, or all but the last `|n|`
    /// segments for negative `n`.
    pub fn sub_path(&self, n: isize) -> Self {
        let keep = if n >= 0 {
            n.unsigned_abs().min(self.segments.len())
        } else {
            self.segments.len().saturating_sub(n.unsigned_abs())
        };
        Self {
            segments: self.segments[..keep].to_vec(),
        }
    }

    /// The parent path. The root is its own parent.
    pub fn parent(&self) -> Self {
        self.sub_path(-1)
    }

    /// The last segment, or `""` for the root.
    pub fn basename(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// The path without leading or trailing slash, as used in cache keys.
    pub fn relative(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for DamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl From<&str> for DamPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for DamPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DamPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
