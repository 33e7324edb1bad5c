// SPDX-License-Identifier: Apache-2.0

//! `gcfbench view` command - Render a saved results artifact.

use std::path::PathBuf;

use gcfbench_core::{ResultsViewer, RunConfig};

pub async fn execute(
    config_path: &str,
    dir: Option<PathBuf>,
    file: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Explicit arguments win; otherwise fall back to the run configuration.
    let (dir, file) = match (dir, file) {
        (Some(dir), Some(file)) => (dir, file),
        (dir, file) => {
            let config = RunConfig::load(config_path)?;
            (
                dir.unwrap_or(config.results_dir),
                file.unwrap_or(config.results_file),
            )
        }
    };

    ResultsViewer::new().display(&dir, &file)?;
    Ok(())
}
