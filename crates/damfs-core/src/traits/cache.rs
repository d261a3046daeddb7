//! Object cache trait for memoizing resolved values by key.

use async_trait::async_trait;

use crate::result::AppResult;

/// A keyed store with first-writer-wins population.
///
/// Values are snapshots that stay valid for the life of the entry, so an
/// existing entry is never overwritten by a later, redundant resolution.
#[async_trait]
pub trait ObjectCache<V>: Send + Sync + std::fmt::Debug + 'static
where
    V: Clone + Send + Sync + 'static,
{
    /// Get a value by key. Returns `None` if absent or expired.
    async fn get(&self, key: &str) -> AppResult<Option<V>>;

    /// Store `value` only if no entry exists for `key`.
    ///
    /// Returns `true` if this call stored the value.
    async fn set_if_absent(&self, key: &str, value: V) -> AppResult<bool>;

    /// Drop the entry for `key`, if any.
    async fn invalidate(&self, key: &str) -> AppResult<()>;

    /// Drop every entry.
    async fn clear(&self) -> AppResult<()>;

    /// Number of live entries, as far as the backend can tell.
    fn entry_count(&self) -> u64;
}
