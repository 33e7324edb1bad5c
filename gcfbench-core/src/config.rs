// SPDX-License-Identifier: Apache-2.0

//! YAML run configuration with validation at load time.
//!
//! A run configuration names the benchmark, the target regions, how many
//! function instances to deploy, and where the results artifact goes.
//! Invalid fields are rejected before any deployment starts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult, ValidationError};
use crate::types::BaseName;

fn default_instances() -> u32 {
    1
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_results_file() -> String {
    "results.json".to_string()
}

fn default_runtime() -> String {
    "nodejs20".to_string()
}

fn default_entry_point() -> String {
    "testFunction".to_string()
}

fn default_cold_requests() -> u32 {
    1
}

fn default_warm_requests() -> u32 {
    10
}

fn default_deployment_timeout_secs() -> u64 {
    600
}

/// Configuration for one benchmark run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Base name from which instance names are derived.
    pub base_name: String,

    /// Number of function instances to deploy.
    #[serde(default = "default_instances")]
    pub instances: u32,

    /// Target regions, assigned to instances round-robin. Empty means the
    /// deployer's default region.
    #[serde(default)]
    pub regions: Vec<String>,

    /// Cloud project identifier, if the deployer needs one.
    #[serde(default)]
    pub project: Option<String>,

    /// Directory holding the function source to deploy.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,

    /// Function runtime identifier.
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Entry point symbol inside the function source.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Extra environment variables passed to deployed functions.
    #[serde(default)]
    pub environment: HashMap<String, String>,

    /// Maximum concurrent deployments. None means unlimited.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,

    /// Per-deployment timeout in seconds.
    #[serde(default = "default_deployment_timeout_secs")]
    pub deployment_timeout_secs: u64,

    /// Requests issued against a cold instance.
    #[serde(default = "default_cold_requests")]
    pub cold_requests: u32,

    /// Requests issued against a warm instance.
    #[serde(default = "default_warm_requests")]
    pub warm_requests: u32,

    /// Directory the results artifact is written to.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Filename of the results artifact.
    #[serde(default = "default_results_file")]
    pub results_file: String,
}

impl RunConfig {
    /// Load and validate a run configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BenchError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path).map_err(|source| BenchError::Io {
            context: "reading configuration file",
            source,
        })?;

        let config: Self =
            serde_yaml::from_str(&contents).map_err(|err| BenchError::ConfigParse {
                message: err.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate field values and return the parsed base name.
    pub fn validate(&self) -> Result<BaseName, ValidationError> {
        if self.instances == 0 {
            return Err(ValidationError::InvalidInstanceCount {
                count: self.instances,
            });
        }
        BaseName::new(self.base_name.clone())
    }

    /// Region assigned to an instance ordinal, round-robin over the
    /// configured regions.
    pub fn region_for(&self, index: u32) -> Option<&str> {
        if self.regions.is_empty() {
            return None;
        }
        let slot = index as usize % self.regions.len();
        Some(self.regions[slot].as_str())
    }
}
