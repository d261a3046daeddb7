//! Remote gateway configuration.

use serde::{Deserialize, Serialize};

/// Selects and seeds the remote gateway provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Provider type. Only `"memory"` ships with DamFS.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// JSON snapshot used to seed the in-memory provider.
    #[serde(default)]
    pub snapshot: Option<String>,
    /// Artificial latency added to every remote call, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            snapshot: None,
            latency_ms: 0,
        }
    }
}

fn default_provider() -> String {
    "memory".to_string()
}
