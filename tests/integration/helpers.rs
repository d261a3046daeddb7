//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use damfs_core::config::cache::CacheConfig;
use damfs_core::traits::gateway::RemoteGateway;
use damfs_core::types::{DamPath, DocumentId, FolderId};
use damfs_fs::FsAdapter;
use damfs_gateway::MemoryGateway;
use damfs_repository::{Repository, RepositorySettings};

/// An in-memory DAM with a repository on top of it.
pub struct TestDam {
    /// The counting in-memory gateway
    pub gateway: Arc<MemoryGateway>,
    /// The repository under test
    pub repository: Arc<Repository>,
    /// Folder ids seeded so far, by path
    seeded: Mutex<HashMap<String, FolderId>>,
}

impl TestDam {
    /// Create an empty tree
    pub async fn new() -> Self {
        Self::build(MemoryGateway::new(), RepositorySettings::default()).await
    }

    /// Create an empty tree whose every remote call takes `millis`
    pub async fn with_latency(millis: u64) -> Self {
        let gateway = MemoryGateway::new().with_latency(Duration::from_millis(millis));
        Self::build(gateway, RepositorySettings::default()).await
    }

    /// Create an empty tree behind a read-only repository
    pub async fn read_only() -> Self {
        let settings = RepositorySettings {
            read_only: true,
            ..RepositorySettings::default()
        };
        Self::build(MemoryGateway::new(), settings).await
    }

    async fn build(gateway: MemoryGateway, settings: RepositorySettings) -> Self {
        let gateway = Arc::new(gateway);
        let root = gateway.root_id().await;
        let repository = Arc::new(Repository::new(
            Arc::clone(&gateway) as Arc<dyn RemoteGateway>,
            settings,
        ));
        Self {
            gateway,
            repository,
            seeded: Mutex::new(HashMap::from([("/".to_string(), root)])),
        }
    }

    /// Seed every missing folder along `path` and return the last one's id
    pub async fn seed_folder(&self, path: &str) -> FolderId {
        let path = DamPath::parse(path);
        let mut parent = self.seeded_id(&DamPath::root());
        for depth in 1..=path.len() {
            let prefix = path.sub_path(depth as isize);
            let known = self.seeded.lock().unwrap().get(&prefix.to_string()).copied();
            parent = match known {
                Some(id) => id,
                None => {
                    let id = self
                        .gateway
                        .add_folder(parent, prefix.basename())
                        .await
                        .unwrap();
                    self.seeded.lock().unwrap().insert(prefix.to_string(), id);
                    id
                }
            };
        }
        parent
    }

    /// Seed a document, creating its parent folders as needed
    pub async fn seed_document(&self, path: &str, content: &str) -> DocumentId {
        let path = DamPath::parse(path);
        let parent = self.seed_folder(&path.parent().to_string()).await;
        self.gateway
            .add_document(parent, path.basename(), content.to_string())
            .await
            .unwrap()
    }

    fn seeded_id(&self, path: &DamPath) -> FolderId {
        *self
            .seeded
            .lock()
            .unwrap()
            .get(&path.to_string())
            .expect("parent folder was not seeded")
    }

    /// Calls served for one gateway operation
    pub fn calls(&self, operation: &str) -> u64 {
        self.gateway.calls(operation)
    }

    /// Calls served across all gateway operations
    pub fn total_calls(&self) -> u64 {
        self.gateway.total_calls()
    }

    /// Reset the gateway call counters
    pub fn reset_calls(&self) {
        self.gateway.reset_calls();
    }

    /// A file-system adapter with an in-memory document cache
    pub fn adapter(&self) -> FsAdapter {
        FsAdapter::from_config(
            Arc::clone(&self.repository),
            &CacheConfig::default(),
            "test",
        )
        .unwrap()
    }
}
