//! Cache manager that dispatches to the configured provider.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use damfs_core::config::cache::CacheConfig;
use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::cache::ObjectCache;

use crate::noop::NoopObjectCache;

/// Cache manager that wraps the configured object cache provider.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug)]
pub struct CacheManager<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    /// The inner cache provider.
    inner: Arc<dyn ObjectCache<V>>,
}

impl<V> Clone for CacheManager<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> CacheManager<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    /// Create a new cache manager from configuration.
    pub fn new(config: &CacheConfig) -> AppResult<Self> {
        let inner: Arc<dyn ObjectCache<V>> = match config.provider.as_str() {
            #[cfg(feature = "memory")]
            "memory" => {
                info!(
                    max_capacity = config.memory.max_capacity,
                    ttl_seconds = config.memory.time_to_live_seconds,
                    "Initializing in-memory object cache"
                );
                Arc::new(crate::memory::MemoryObjectCache::new(&config.memory))
            }
            "none" => {
                info!("Object cache disabled");
                Arc::new(NoopObjectCache::new())
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown cache provider: '{other}'. Supported: memory, none"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a cache manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn ObjectCache<V>>) -> Self {
        Self { inner: provider }
    }

    /// Get a reference to the inner provider.
    pub fn provider(&self) -> &dyn ObjectCache<V> {
        self.inner.as_ref()
    }
}

#[async_trait]
impl<V> ObjectCache<V> for CacheManager<V>
where
    V: Clone + Send + Sync + Debug + 'static,
{
    async fn get(&self, key: &str) -> AppResult<Option<V>> {
        self.inner.get(key).await
    }

    async fn set_if_absent(&self, key: &str, value: V) -> AppResult<bool> {
        self.inner.set_if_absent(key, value).await
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.inner.invalidate(key).await
    }

    async fn clear(&self) -> AppResult<()> {
        self.inner.clear().await
    }

    fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}
