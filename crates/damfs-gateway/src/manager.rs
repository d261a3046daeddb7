//! Gateway connector: builds the configured provider.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use damfs_core::config::gateway::GatewayConfig;
use damfs_core::error::AppError;
use damfs_core::result::AppResult;
use damfs_core::traits::gateway::RemoteGateway;

use crate::providers::MemoryGateway;

/// A connected gateway provider.
#[derive(Debug, Clone)]
pub enum Connection {
    /// The in-memory DAM model.
    Memory(Arc<MemoryGateway>),
}

impl Connection {
    /// The provider as a trait object.
    pub fn gateway(&self) -> Arc<dyn RemoteGateway> {
        match self {
            Self::Memory(gateway) => Arc::clone(gateway) as Arc<dyn RemoteGateway>,
        }
    }

    /// Persist provider state, where the provider supports it.
    pub async fn save(&self, path: impl AsRef<Path>) -> AppResult<()> {
        match self {
            Self::Memory(gateway) => gateway.save(path).await,
        }
    }
}

/// Connect to the provider named in the configuration.
///
/// A configured snapshot file that does not exist yet starts an empty tree.
pub async fn connect(config: &GatewayConfig) -> AppResult<Connection> {
    match config.provider.as_str() {
        "memory" => {
            let gateway = match &config.snapshot {
                Some(path) if Path::new(path).exists() => MemoryGateway::load(path).await?,
                _ => MemoryGateway::new(),
            };
            let gateway = gateway.with_latency(Duration::from_millis(config.latency_ms));
            info!(
                snapshot = config.snapshot.as_deref().unwrap_or("<empty>"),
                latency_ms = config.latency_ms,
                "Initializing in-memory gateway"
            );
            Ok(Connection::Memory(Arc::new(gateway)))
        }
        other => Err(AppError::configuration(format!(
            "Unknown gateway provider: '{other}'. Supported: memory"
        ))),
    }
}
