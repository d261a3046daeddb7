//! Integration tests for the document cache and concurrent resolution.

mod helpers;

use std::sync::Arc;

use damfs_cache::memory::MemoryObjectCache;
use damfs_core::config::cache::{CacheConfig, MemoryCacheConfig};
use damfs_core::traits::cache::ObjectCache;
use damfs_core::types::DamPath;
use damfs_fs::FsAdapter;
use damfs_gateway::providers::memory::ops;
use damfs_repository::Document;

fn path(s: &str) -> DamPath {
    DamPath::parse(s)
}

fn adapter_with(dam: &helpers::TestDam) -> (Arc<MemoryObjectCache<Document>>, FsAdapter) {
    let cache = Arc::new(MemoryObjectCache::new(&MemoryCacheConfig::default()));
    let adapter = FsAdapter::new(
        Arc::clone(&dam.repository),
        Arc::clone(&cache) as Arc<dyn ObjectCache<Document>>,
        "test",
    );
    (cache, adapter)
}

#[tokio::test]
async fn test_concurrent_misses_store_once() {
    let dam = helpers::TestDam::with_latency(20).await;
    let id = dam.seed_document("/a/doc.txt", "shared").await;
    let (cache, adapter) = adapter_with(&dam);
    let target = path("/a/doc.txt");

    let (first, second) = tokio::join!(
        adapter.document_by_path(&target),
        adapter.document_by_path(&target)
    );
    assert_eq!(first.unwrap().unwrap().id(), id);
    assert_eq!(second.unwrap().unwrap().id(), id);

    cache.sync().await;
    assert_eq!(cache.entry_count(), 1);

    dam.reset_calls();
    let third = adapter.document_by_path(&target).await.unwrap().unwrap();
    assert_eq!(third.id(), id);
    assert_eq!(dam.total_calls(), 0);
}

#[tokio::test]
async fn test_misses_leave_cache_empty() {
    let dam = helpers::TestDam::new().await;
    dam.seed_folder("/a/sub").await;
    let (cache, adapter) = adapter_with(&dam);

    assert!(adapter.document_by_path(&path("/a/missing.txt")).await.unwrap().is_none());
    assert!(adapter.document_by_path(&path("/a/sub")).await.unwrap().is_none());
    assert!(adapter.document_by_path(&path("/zzz/doc.txt")).await.unwrap().is_none());

    cache.sync().await;
    assert_eq!(cache.entry_count(), 0);
}

#[tokio::test]
async fn test_lookup_does_not_fill_parent_listing() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    dam.seed_folder("/a/other").await;
    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();
    let (_, adapter) = adapter_with(&dam);

    dam.reset_calls();
    adapter.document_by_path(&path("/a/doc.txt")).await.unwrap().unwrap();
    assert_eq!(dam.calls(ops::LIST_SUBFOLDERS), 0);
    assert!(!a.has_cached_subfolders().await);
}

#[tokio::test]
async fn test_forget_after_change() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    let (cache, adapter) = adapter_with(&dam);
    let target = path("/a/doc.txt");

    let document = adapter.document_by_path(&target).await.unwrap().unwrap();
    dam.repository.delete_document(&document).await.unwrap();

    // Still memoized until the caller forgets it.
    assert!(adapter.document_by_path(&target).await.unwrap().is_some());

    adapter.forget(&target).await.unwrap();
    assert!(adapter.document_by_path(&target).await.unwrap().is_none());
    cache.sync().await;
    assert_eq!(cache.entry_count(), 0);
}

#[tokio::test]
async fn test_scopes_do_not_share_entries() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    let cache = Arc::new(MemoryObjectCache::new(&MemoryCacheConfig::default()));
    let shared = Arc::clone(&cache) as Arc<dyn ObjectCache<Document>>;
    let left = FsAdapter::new(Arc::clone(&dam.repository), Arc::clone(&shared), "left");
    let right = FsAdapter::new(Arc::clone(&dam.repository), shared, "right");

    left.document_by_path(&path("/a/doc.txt")).await.unwrap();
    dam.reset_calls();
    right.document_by_path(&path("/a/doc.txt")).await.unwrap();
    assert!(dam.total_calls() > 0);

    cache.sync().await;
    assert_eq!(cache.entry_count(), 2);
}

#[tokio::test]
async fn test_disabled_cache_always_asks_repository() {
    let dam = helpers::TestDam::new().await;
    dam.seed_document("/a/doc.txt", "x").await;
    let config = CacheConfig {
        provider: "none".to_string(),
        ..CacheConfig::default()
    };
    let adapter = FsAdapter::from_config(Arc::clone(&dam.repository), &config, "test").unwrap();

    adapter.document_by_path(&path("/a/doc.txt")).await.unwrap();
    dam.reset_calls();
    adapter.document_by_path(&path("/a/doc.txt")).await.unwrap();
    assert_eq!(dam.calls(ops::FIND_DOCUMENT_BY_NAME), 1);
}

#[tokio::test]
async fn test_concurrent_resolution_shares_instance() {
    let dam = helpers::TestDam::with_latency(10).await;
    dam.seed_folder("/a/b/c").await;
    let target = path("/a/b/c");

    let (first, second) = tokio::join!(
        dam.repository.resolve_folder(&target),
        dam.repository.resolve_folder(&target)
    );
    assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
}

#[tokio::test]
async fn test_concurrent_listing_fills_once() {
    let dam = helpers::TestDam::with_latency(10).await;
    dam.seed_folder("/a/x").await;
    dam.seed_folder("/a/y").await;
    let a = dam.repository.resolve_folder(&path("/a")).await.unwrap();

    dam.reset_calls();
    let (first, second) = tokio::join!(
        a.subfolders(&dam.repository, 0, None),
        a.subfolders(&dam.repository, 0, None)
    );
    assert_eq!(first.unwrap().len(), 2);
    assert_eq!(second.unwrap().len(), 2);
    assert_eq!(dam.calls(ops::LIST_SUBFOLDERS), 1);
}
