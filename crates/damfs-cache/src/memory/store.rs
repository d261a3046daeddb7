//! In-memory object cache using the moka crate.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use damfs_core::config::cache::MemoryCacheConfig;
use damfs_core::result::AppResult;
use damfs_core::traits::cache::ObjectCache;

/// In-memory object cache using moka.
#[derive(Debug, Clone)]
pub struct MemoryObjectCache<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    /// The underlying moka cache.
    cache: Cache<String, V>,
}

impl<V> MemoryObjectCache<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .build();

        Self { cache }
    }

    /// Apply pending evictions so that [`ObjectCache::entry_count`] is exact.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl<V> ObjectCache<V> for MemoryObjectCache<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    async fn get(&self, key: &str) -> AppResult<Option<V>> {
        let value = self.cache.get(key).await;
        debug!(key, hit = value.is_some(), "Object cache lookup");
        Ok(value)
    }

    async fn set_if_absent(&self, key: &str, value: V) -> AppResult<bool> {
        // The entry API inserts atomically; concurrent callers for the same
        // key all see the first stored value.
        let entry = self.cache.entry(key.to_string()).or_insert(value).await;
        let stored = entry.is_fresh();
        debug!(key, stored, "Object cache set-if-absent");
        Ok(stored)
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.cache.invalidate_all();
        Ok(())
    }

    fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
