//! Object cache that stores nothing.

use std::fmt::Debug;
use std::marker::PhantomData;

use async_trait::async_trait;

use damfs_core::result::AppResult;
use damfs_core::traits::cache::ObjectCache;

/// Every lookup misses and every write is dropped. Selected with
/// `cache.provider = "none"`.
#[derive(Debug)]
pub struct NoopObjectCache<V> {
    _value: PhantomData<fn() -> V>,
}

impl<V> Default for NoopObjectCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NoopObjectCache<V> {
    /// Create a no-op cache.
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

#[async_trait]
impl<V> ObjectCache<V> for NoopObjectCache<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    async fn get(&self, _key: &str) -> AppResult<Option<V>> {
        Ok(None)
    }

    async fn set_if_absent(&self, _key: &str, _value: V) -> AppResult<bool> {
        Ok(false)
    }

    async fn invalidate(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        0
    }
}
