// SPDX-License-Identifier: Apache-2.0

//! Deployment collaborator backed by the `gcloud` CLI.
//!
//! Spawns `gcloud functions deploy` for each instance, times the call, and
//! parses the endpoint URL out of the JSON response. Every way the
//! deployment can go wrong ends up as a failed `DeploymentResult`, never an
//! error return: the harness records failures as data.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value;
use tokio::process::Command;

use gcfbench_core::{DeployOutcome, DeployRequest, Deployer, DeploymentDuration, DeploymentResult, RunConfig};

/// How many trailing stderr lines to keep in a failure description.
const STDERR_TAIL_LINES: usize = 5;

pub struct GcloudDeployer {
    project: Option<String>,
    source_dir: Option<PathBuf>,
    runtime: String,
    entry_point: String,
    environment: HashMap<String, String>,
    timeout: Duration,
}

impl GcloudDeployer {
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            project: config.project.clone(),
            source_dir: config.source_dir.clone(),
            runtime: config.runtime.clone(),
            entry_point: config.entry_point.clone(),
            environment: config.environment.clone(),
            timeout: Duration::from_secs(config.deployment_timeout_secs),
        }
    }

    /// Build the full argument list for one deployment.
    fn build_args(&self, request: &DeployRequest) -> Vec<String> {
        let mut args = vec![
            "functions".to_string(),
            "deploy".to_string(),
            request.name.clone(),
            "--gen2".to_string(),
            format!("--runtime={}", self.runtime),
            format!("--entry-point={}", self.entry_point),
            "--trigger-http".to_string(),
            "--allow-unauthenticated".to_string(),
            "--quiet".to_string(),
            "--format=json".to_string(),
        ];

        if let Some(region) = &request.region {
            args.push(format!("--region={region}"));
        }
        if let Some(project) = &self.project {
            args.push(format!("--project={project}"));
        }
        if let Some(source) = &self.source_dir {
            args.push(format!("--source={}", source.display()));
        }

        let mut env_vars: Vec<String> = self
            .environment
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        env_vars.push(format!("DISPLAY_NAME={}", request.display_name));
        env_vars.sort();
        args.push(format!("--set-env-vars={}", env_vars.join(",")));

        args
    }
}

impl Deployer for GcloudDeployer {
    async fn deploy(&self, request: DeployRequest) -> DeployOutcome {
        let args = self.build_args(&request);
        let region = request.region.clone();
        let start = Instant::now();

        tracing::debug!(name = %request.name, "Invoking gcloud functions deploy");

        let command = Command::new("gcloud")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = match tokio::time::timeout(self.timeout, command).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return DeployOutcome::bare(DeploymentResult::Failure {
                    error: format!("failed to invoke gcloud: {err}"),
                    used_region: region,
                });
            }
            Err(_) => {
                return DeployOutcome::bare(DeploymentResult::Failure {
                    error: format!(
                        "deployment timed out after {}s",
                        self.timeout.as_secs()
                    ),
                    used_region: region,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr
                .lines()
                .rev()
                .take(STDERR_TAIL_LINES)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return DeployOutcome::bare(DeploymentResult::Failure {
                error: format!("gcloud exited with {}: {}", output.status, tail.join(" | ")),
                used_region: region,
            });
        }

        let elapsed = start.elapsed();
        let response: Value = match serde_json::from_slice(&output.stdout) {
            Ok(value) => value,
            Err(err) => {
                return DeployOutcome::bare(DeploymentResult::Failure {
                    error: format!("unparseable gcloud response: {err}"),
                    used_region: region,
                });
            }
        };

        let Some(url) = endpoint_url(&response) else {
            return DeployOutcome::bare(DeploymentResult::Failure {
                error: "deployment succeeded but response carried no endpoint URL".to_string(),
                used_region: region,
            });
        };

        let result = DeploymentResult::Success {
            url,
            used_region: region,
            duration: Some(DeploymentDuration::from_duration(elapsed)),
            deploy_time: Some(Utc::now().to_rfc3339()),
        };

        DeployOutcome {
            result,
            details: HashMap::from([("gcloud_response".to_string(), response)]),
        }
    }
}

/// Extract the function endpoint from a gcloud deploy response.
/// Gen2 responses carry `serviceConfig.uri`; Gen1 uses `httpsTrigger.url`.
fn endpoint_url(response: &Value) -> Option<String> {
    response["serviceConfig"]["uri"]
        .as_str()
        .or_else(|| response["url"].as_str())
        .or_else(|| response["httpsTrigger"]["url"].as_str())
        .map(String::from)
}
