pub mod observability_config;
pub mod storage_config;
pub mod temporal_config;

use serde::{Deserialize, Serialize};

pub use observability_config::ObservabilityConfig;
pub use storage_config::StorageConfig;
pub use temporal_config::TemporalConfig;

use crate::errors::{SagaError, SagaResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SagaConfig {
    pub storage: StorageConfig,
    pub temporal: TemporalConfig,
    pub observability: ObservabilityConfig,
}

impl SagaConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load config from a TOML file on disk.
    pub fn from_file(path: &std::path::Path) -> SagaResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SagaError::ConfigError(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&raw).map_err(|e| SagaError::ConfigError(e.to_string()))
    }
}
