//! Application configuration

use gencache_engine::{EngineConfig, OrchestratorConfig};
use gencache_telemetry::PersistenceConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the binary needs, loadable from one YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(snapshot) = &cli.snapshot {
            config.persistence.snapshot_path = snapshot.clone();
        }

        if cli.no_adaptive {
            config.orchestrator.enable_adaptive = false;
        }

        if let Some(threshold) = cli.ready_accuracy {
            config.engine.ready_accuracy = threshold;
        }

        Ok(config)
    }
}
