//! Advisor settings, persisted as JSON at
//! `<config dir>/model-advisor/advisor.json`.
//!
//! The file only holds policy. Hardware is re-detected on every run and is
//! never written here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use hardware_profile::{BackendPolicy, CollectorOptions};
use model_catalog::ModelCatalog;
use model_recommender::ScoringPolicy;
use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "model-advisor";
const CONFIG_FILE_NAME: &str = "advisor.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Catalog document to rank. The built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,

    /// Workload size, in GB, used for backend selection. The default is a
    /// 7B model at Q4 quantization.
    pub target_size_gb: f64,

    /// Upper bound on each hardware probe.
    pub probe_timeout_ms: u64,

    pub scoring: ScoringPolicy,

    pub backend: BackendPolicy,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            target_size_gb: 5.5,
            probe_timeout_ms: 2000,
            scoring: ScoringPolicy::default(),
            backend: BackendPolicy::default(),
        }
    }
}

impl AdvisorConfig {
    /// Load from `path` if given, otherwise from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::config_path()?),
        }
    }

    /// Load config from a specific path.
    /// If the file doesn't exist, returns a default config.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "Advisor config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read advisor config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse advisor config from {}", path.display()))?;

        log::info!("Advisor config loaded from {}", path.display());
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            probe_timeout: Duration::from_millis(self.probe_timeout_ms),
            ..CollectorOptions::default()
        }
    }

    /// The catalog at `override_path`, else the configured one, else the built-in.
    pub fn load_catalog(&self, override_path: Option<&Path>) -> Result<ModelCatalog> {
        match override_path.or(self.catalog_path.as_deref()) {
            Some(path) => Ok(ModelCatalog::load_from(path)?),
            None => Ok(ModelCatalog::builtin()?),
        }
    }
}
