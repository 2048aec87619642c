//! Orchestrator settings.
//!
//! Every field has a default, so an empty TOML document is a valid config.
//! The collaborator timeout default (5 s) is chosen here; the storage
//! backends themselves impose none.

use std::time::Duration;

use corelib::DEFAULT_VIRTUAL_NODES;
use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Distinct nodes each segment is placed on.
    pub replication_factor: usize,
    /// Ring points per node registered through the orchestrator.
    pub virtual_nodes: u32,
    /// Lifetime of cached segment records.
    pub cache_ttl_secs: u64,
    /// Upper bound on every metadata, cache and blob call.
    pub operation_timeout_ms: u64,
    /// Quality label for segments stored without one.
    pub default_quality: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            replication_factor: 3,
            virtual_nodes: DEFAULT_VIRTUAL_NODES,
            cache_ttl_secs: 3600,
            operation_timeout_ms: 5_000,
            default_quality: "1080p".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Parse a TOML document, filling unset fields with defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| OrchestratorError::Configuration(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.replication_factor == 0 {
            return Err(OrchestratorError::Configuration(
                "replication_factor must be at least 1".into(),
            ));
        }
        if self.virtual_nodes == 0 {
            return Err(OrchestratorError::Configuration(
                "virtual_nodes must be at least 1".into(),
            ));
        }
        if self.operation_timeout_ms == 0 {
            return Err(OrchestratorError::Configuration(
                "operation_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = OrchestratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, OrchestratorConfig::default());
        assert_eq!(config.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = OrchestratorConfig::from_toml_str(
            "replication_factor = 2\noperation_timeout_ms = 250\n",
        )
        .unwrap();
        assert_eq!(config.replication_factor, 2);
        assert_eq!(config.operation_timeout(), Duration::from_millis(250));
        assert_eq!(config.virtual_nodes, 150);
    }

    #[test]
    fn test_rejects_zero_replication() {
        let err = OrchestratorConfig::from_toml_str("replication_factor = 0").unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));
    }

    #[test]
    fn test_rejects_unparseable_document() {
        assert!(OrchestratorConfig::from_toml_str("replication_factor = \"three\"").is_err());
    }
}
