// SPDX-License-Identifier: Apache-2.0

//! Human-readable report rendering for benchmark results.
//!
//! The viewer reads a persisted results artifact and writes a formatted
//! report to stdout. A missing or corrupt artifact is a reportable
//! condition, not a crash: it becomes an explanatory line in the report so
//! the tool stays usable standalone.

use std::io::{self, Write};
use std::path::Path;

use crate::aggregator::RunSummary;
use crate::artifact::{ArtifactWriter, RunArtifact};
use crate::instance::{InstanceEntry, LifecycleState};

const RULE: &str =
    "================================================================================";

/// Renders aggregated results into a textual report.
#[derive(Debug, Default)]
pub struct ResultsViewer;

impl ResultsViewer {
    pub fn new() -> Self {
        Self
    }

    /// Locate the results artifact at `directory/filename`, load it, and
    /// write a formatted report to stdout.
    ///
    /// Every call produces visible output; artifact problems are reported
    /// through the same output channel instead of being propagated.
    pub fn display(&self, directory: &Path, filename: &str) -> io::Result<()> {
        let stdout = io::stdout();
        self.render(directory, filename, &mut stdout.lock())
    }

    /// Render the report for an artifact into any writer.
    pub fn render<W: Write>(&self, directory: &Path, filename: &str, out: &mut W) -> io::Result<()> {
        let path = directory.join(filename);

        if !path.exists() {
            writeln!(out, "No results artifact found at {}", path.display())?;
            return Ok(());
        }

        match ArtifactWriter::load(&path) {
            Ok(artifact) => self.render_artifact(&artifact, out),
            Err(err) => {
                writeln!(
                    out,
                    "Results artifact {} could not be read: {}",
                    path.display(),
                    err
                )
            }
        }
    }

    /// Render a loaded artifact: header, per-entry lines, summary footer.
    pub fn render_artifact<W: Write>(&self, artifact: &RunArtifact, out: &mut W) -> io::Result<()> {
        writeln!(out, "{RULE}")?;
        writeln!(out, "BENCHMARK RESULTS")?;
        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "Suite: {} v{}  ({})",
            artifact.benchmark_suite,
            artifact.version,
            artifact.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(out)?;

        if artifact.entries.is_empty() {
            writeln!(out, "No results recorded.")?;
            return Ok(());
        }

        for entry in &artifact.entries {
            self.render_entry(entry, out)?;
        }

        let summary = summarize(&artifact.entries);
        writeln!(out)?;
        self.render_summary(&summary, out)
    }

    fn render_entry<W: Write>(&self, entry: &InstanceEntry, out: &mut W) -> io::Result<()> {
        let name = entry.name.as_deref().unwrap_or("<unnamed>");
        let region = entry.deployment.used_region.as_deref().unwrap_or("-");

        match entry.state {
            LifecycleState::DeployFailed => {
                let reason = entry.deployment.error.as_deref().unwrap_or("unknown error");
                writeln!(
                    out,
                    "  [{:03}] {:<28} FAILED    region={}  error: {}",
                    entry.index, name, region, reason
                )?;
            }
            _ => {
                let url = entry.deployment.url.as_deref().unwrap_or("-");
                let duration = entry
                    .deployment
                    .deployment_duration_seconds
                    .map(|s| format!("{s:.2}s"))
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    out,
                    "  [{:03}] {:<28} {:<9} region={}  deploy={}  url={}",
                    entry.index,
                    name,
                    status_label(entry),
                    region,
                    duration,
                    url
                )?;
                if let Some(metrics) = &entry.test_result {
                    let cold = metric(metrics, "cold_start_avg_ms");
                    let warm = metric(metrics, "warm_start_avg_ms");
                    writeln!(
                        out,
                        "        cold start avg: {cold}  warm start avg: {warm}"
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Render the aggregate totals block.
    pub fn render_summary<W: Write>(&self, summary: &RunSummary, out: &mut W) -> io::Result<()> {
        writeln!(out, "{RULE}")?;
        writeln!(out, "RUN SUMMARY")?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "Total functions:       {}", summary.total)?;
        writeln!(out, "Successfully deployed: {}", summary.deployed)?;
        writeln!(out, "Failed to deploy:      {}", summary.failed)?;
        writeln!(out, "Tested:                {}", summary.tested)?;
        Ok(())
    }
}

fn status_label(entry: &InstanceEntry) -> &'static str {
    match entry.state {
        LifecycleState::Created => "created",
        LifecycleState::Named => "named",
        LifecycleState::Deployed => "deployed",
        LifecycleState::DeployFailed => "FAILED",
        LifecycleState::Tested => "tested",
    }
}

fn metric(metrics: &std::collections::HashMap<String, serde_json::Value>, key: &str) -> String {
    metrics
        .get(key)
        .and_then(|v| v.as_f64())
        .map(|ms| format!("{ms:.2}ms"))
        .unwrap_or_else(|| "-".to_string())
}

fn summarize(entries: &[InstanceEntry]) -> RunSummary {
    let mut summary = RunSummary::default();
    for entry in entries {
        summary.total += 1;
        if entry.deployed {
            summary.deployed += 1;
        }
        if entry.test_result.is_some() {
            summary.tested += 1;
        }
        if entry.state == LifecycleState::DeployFailed {
            summary.failed += 1;
        }
    }
    summary
}
