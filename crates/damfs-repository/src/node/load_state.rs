//! Tri-state marker for lazily loaded values.

/// A lazily loaded value.
///
/// `Invalidated` behaves like `NotLoaded` for readers but records that a
/// value was dropped because the remote may have changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState<T> {
    /// Never loaded.
    #[default]
    NotLoaded,
    /// Loaded and current.
    Loaded(T),
    /// Dropped after a structural change.
    Invalidated,
}

impl<T> LoadState<T> {
    /// The loaded value, if any.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::NotLoaded | Self::Invalidated => None,
        }
    }

    /// Whether a current value is present.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Drop the value, remembering that it was invalidated.
    pub fn invalidate(&mut self) {
        *self = Self::Invalidated;
    }
}
