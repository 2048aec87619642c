//! Command line arguments and config file loading.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use orchestrator::OrchestratorConfig;

use crate::commands::{Command, CommandResult};

#[derive(Debug, Parser)]
#[command(
    name = "segctl",
    version,
    about = "Consistent-hash placement for video segments"
)]
pub struct CliConfig {
    /// Path to an orchestrator TOML config file.
    #[arg(short, long, global = true, env = "SEGCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured replication factor.
    #[arg(short, long, global = true, env = "REPLICATION_FACTOR")]
    pub replication_factor: Option<usize>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Orchestrator settings: file (or defaults), then flag/env overrides.
    pub fn orchestrator_config(&self) -> Result<OrchestratorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                OrchestratorConfig::from_toml_str(&raw)
                    .with_context(|| format!("failed to load config {}", path.display()))?
            }
            None => OrchestratorConfig::default(),
        };

        if let Some(rf) = self.replication_factor {
            config.replication_factor = rf;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    pub async fn run(&self) -> Result<CommandResult> {
        let config = self.orchestrator_config()?;
        self.command.run(&config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_overrides() {
        let cli = CliConfig::try_parse_from(["segctl", "-r", "2", "lookup", "seg-1"]).unwrap();
        let config = cli.orchestrator_config().unwrap();
        assert_eq!(config.replication_factor, 2);
        assert_eq!(config.virtual_nodes, 150);
    }

    #[test]
    fn test_zero_replication_factor_is_rejected() {
        let cli = CliConfig::try_parse_from(["segctl", "-r", "0", "lookup", "seg-1"]).unwrap();
        assert!(cli.orchestrator_config().is_err());
    }

    #[test]
    fn test_config_file_is_loaded() {
        let path = std::env::temp_dir().join(format!("segctl-test-{}.toml", std::process::id()));
        std::fs::write(&path, "virtual_nodes = 32\ncache_ttl_secs = 60\n").unwrap();

        let cli = CliConfig::try_parse_from([
            "segctl",
            "--config",
            path.to_str().unwrap(),
            "distribution",
        ])
        .unwrap();
        let config = cli.orchestrator_config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.virtual_nodes, 32);
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.replication_factor, 3);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = CliConfig::try_parse_from([
            "segctl",
            "--config",
            "/nonexistent/segctl.toml",
            "distribution",
        ])
        .unwrap();
        let err = cli.orchestrator_config().unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
