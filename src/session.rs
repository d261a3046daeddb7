//! Wires configuration into a gateway, repository, and adapter.

use std::sync::Arc;

use tracing::info;

use damfs_core::config::AppConfig;
use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_fs::FsAdapter;
use damfs_gateway::Connection;
use damfs_repository::{Repository, RepositorySettings};

/// Everything one CLI invocation works with.
pub struct Session {
    connection: Connection,
    snapshot: Option<String>,
    pub repository: Arc<Repository>,
    pub fs: FsAdapter,
}

impl Session {
    /// Connect the configured gateway and build the repository and adapter
    /// on top of it.
    pub async fn open(config: &AppConfig) -> AppResult<Self> {
        let connection = damfs_gateway::connect(&config.gateway).await?;
        let repository = Arc::new(Repository::new(
            connection.gateway(),
            RepositorySettings::from(&config.repository),
        ));
        let fs = FsAdapter::from_config(
            Arc::clone(&repository),
            &config.cache,
            config.repository.storage_scope.clone(),
        )?;

        info!(
            root_folder_id = config.repository.root_folder_id,
            read_only = config.repository.read_only,
            scope = %config.repository.storage_scope,
            "Session opened"
        );
        Ok(Self {
            connection,
            snapshot: config.gateway.snapshot.clone(),
            repository,
            fs,
        })
    }

    /// Write the gateway state back to the configured snapshot.
    pub async fn save(&self) -> AppResult<()> {
        let path = self.snapshot.as_deref().ok_or_else(|| {
            AppError::configuration("--save needs a snapshot path (--snapshot or gateway.snapshot)")
        })?;
        self.connection.save(path).await
    }
}
