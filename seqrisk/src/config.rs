use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AnalysisError, Result};
use crate::helper_functions::project_root;

/// Name of the configuration file looked up under the project root.
pub const CONFIG_FILE_NAME: &str = "seqrisk.json";

/// Tunable parameters of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Width of the sliding window used for repeated motifs
    pub motif_length: usize,
    /// Number of clusters requested from the Cluster Engine
    pub n_clusters: usize,
    /// Seed for centroid initialisation
    pub seed: u64,
    pub max_iterations: u64,
    pub tolerance: f64,
    /// Independent k-means restarts; the best inertia wins
    pub n_runs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            motif_length: 3,
            n_clusters: 3,
            seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.motif_length == 0 {
            return Err(invalid("motif_length", "must be >= 1"));
        }
        if self.n_clusters == 0 {
            return Err(invalid("n_clusters", "must be >= 1"));
        }
        if self.n_runs == 0 {
            return Err(invalid("n_runs", "must be >= 1"));
        }
        if !(self.tolerance > 0.0) {
            return Err(invalid("tolerance", "must be a positive number"));
        }
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Reading configuration from {}", path.display());
        let config: AnalysisConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path if given, else `seqrisk.json` under the project root if it
    /// exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let default_path = default_config_path();
        if default_path.exists() {
            Self::from_file(&default_path)
        } else {
            Ok(Self::default())
        }
    }
}

pub fn default_config_path() -> PathBuf {
    project_root().join(CONFIG_FILE_NAME)
}

pub fn write_default_config(path: &Path) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(&AnalysisConfig::default())?)?;
    info!("Default configuration written to {}", path.display());
    Ok(())
}

fn invalid(parameter: &str, reason: &str) -> AnalysisError {
    AnalysisError::InvalidParameter {
        parameter: parameter.to_string(),
        reason: reason.to_string(),
    }
}
