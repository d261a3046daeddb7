//! Application configuration schemas.
//!
//! All configuration structs are deserialized from an optional TOML file
//! and `DAMFS__*` environment variables via the `config` crate. Every
//! section carries serde defaults, so an empty source set still yields a
//! usable configuration.

pub mod cache;
pub mod gateway;
pub mod logging;
pub mod repository;

use serde::{Deserialize, Serialize};

use self::cache::CacheConfig;
use self::gateway::GatewayConfig;
use self::logging::LoggingConfig;
use self::repository::RepositoryConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repository (path resolution and folder cache) settings.
    #[serde(default)]
    pub repository: RepositoryConfig,
    /// Document object cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Remote gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file overlaid with environment
    /// variables prefixed with `DAMFS__`.
    ///
    /// A missing file is not an error.
    pub fn load(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("DAMFS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
