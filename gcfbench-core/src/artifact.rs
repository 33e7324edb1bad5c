// SPDX-License-Identifier: Apache-2.0

//! JSON persistence for aggregated run results.
//!
//! Handles saving a run's results to a JSON artifact in the results
//! directory and loading it back for viewing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::aggregator::ResultsAggregator;
use crate::error::{BenchError, BenchResult};
use crate::instance::InstanceEntry;

/// Persisted form of one benchmark run: a timestamp plus the instance
/// entries ordered by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifact {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Harness version
    pub version: String,
    /// Timestamp when the run concluded
    pub timestamp: DateTime<Utc>,
    /// Per-instance results, ordered by index
    pub entries: Vec<InstanceEntry>,
}

impl RunArtifact {
    /// Capture the current contents of an aggregator.
    pub fn from_aggregator(aggregator: &ResultsAggregator) -> Self {
        Self {
            benchmark_suite: "gcfbench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            entries: aggregator.entries(),
        }
    }
}

/// Writes and reads run artifacts in a results directory.
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer for the given results directory, creating it if
    /// necessary.
    pub fn new(output_dir: impl AsRef<Path>) -> BenchResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|source| BenchError::Io {
            context: "creating results directory",
            source,
        })?;
        Ok(Self { output_dir })
    }

    /// Save an artifact under the given filename.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, artifact: &RunArtifact, filename: &str) -> BenchResult<PathBuf> {
        let filepath = self.output_dir.join(filename);

        let file = File::create(&filepath).map_err(|source| BenchError::Io {
            context: "creating results artifact",
            source,
        })?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, artifact)?;

        Ok(filepath)
    }

    /// Load an existing artifact from a file.
    pub fn load(path: impl AsRef<Path>) -> BenchResult<RunArtifact> {
        let file = File::open(path.as_ref()).map_err(|source| BenchError::Io {
            context: "opening results artifact",
            source,
        })?;
        let artifact = serde_json::from_reader(file)?;
        Ok(artifact)
    }

    /// List all JSON artifacts in the results directory, sorted by path.
    pub fn list(&self) -> BenchResult<Vec<PathBuf>> {
        let mut artifacts = Vec::new();
        let entries = fs::read_dir(&self.output_dir).map_err(|source| BenchError::Io {
            context: "reading results directory",
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| BenchError::Io {
                context: "reading results directory",
                source,
            })?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                artifacts.push(path);
            }
        }
        artifacts.sort();
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::DeploymentResult;
    use crate::instance::FunctionInstance;
    use crate::types::BaseName;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn sample_aggregator() -> ResultsAggregator {
        let aggregator = ResultsAggregator::new();
        let base = BaseName::new("bench").unwrap();

        let mut ok = FunctionInstance::new(0);
        ok.set_names(&base).unwrap();
        ok.record_deployment(
            DeploymentResult::Success {
                url: "https://f0.example".to_string(),
                used_region: Some("us-east1".to_string()),
                duration: None,
                deploy_time: None,
            },
            HashMap::new(),
        )
        .unwrap();
        aggregator.add(ok).unwrap();

        let mut failed = FunctionInstance::new(1);
        failed.set_names(&base).unwrap();
        failed
            .record_deployment(DeploymentResult::failure("quota"), HashMap::new())
            .unwrap();
        aggregator.add(failed).unwrap();

        aggregator
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path()).unwrap();

        let artifact = RunArtifact::from_aggregator(&sample_aggregator());
        let path = writer.save(&artifact, "results.json").unwrap();
        assert!(path.exists());

        let loaded = ArtifactWriter::load(&path).unwrap();
        assert_eq!(loaded.benchmark_suite, "gcfbench");
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.entries[0].index, 0);
        assert_eq!(loaded.entries[1].index, 1);
        assert_eq!(loaded.entries[1].deployment.error.as_deref(), Some("quota"));
    }

    #[test]
    fn test_list_artifacts() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path()).unwrap();

        let artifact = RunArtifact::from_aggregator(&sample_aggregator());
        writer.save(&artifact, "run-a.json").unwrap();
        writer.save(&artifact, "run-b.json").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let listed = writer.list().unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = ArtifactWriter::load(temp_dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BenchError::Io { .. }));
    }
}
