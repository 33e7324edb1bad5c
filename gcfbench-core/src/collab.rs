//! Seams for the external deployment and test collaborators.
//!
//! The core never talks to a cloud provider or issues HTTP requests itself;
//! it consumes outcomes produced behind these traits. Failures cross the
//! seam as data (a failed `DeploymentResult`, an error key in the metrics
//! map), never as panics or error returns.

use std::collections::HashMap;
use std::future::Future;

use serde_json::Value;

use crate::deployment::DeploymentResult;

/// Everything a deployment collaborator needs to know about one instance.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    pub index: u32,
    /// Deployable function name (lower-case, ordinal-suffixed).
    pub name: String,
    /// Human-facing display name, exported to the function's environment.
    pub display_name: String,
    /// Target region, if the run pins one.
    pub region: Option<String>,
}

/// What came back from a deployment attempt: the outcome plus whatever
/// free-form metadata the provider reported.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    pub result: DeploymentResult,
    pub details: HashMap<String, Value>,
}

impl DeployOutcome {
    /// Outcome with no provider metadata.
    pub fn bare(result: DeploymentResult) -> Self {
        Self {
            result,
            details: HashMap::new(),
        }
    }
}

/// Deploys one function instance and reports the outcome.
pub trait Deployer: Send + Sync {
    fn deploy(&self, request: DeployRequest) -> impl Future<Output = DeployOutcome> + Send;
}

/// Probes a deployed function and reports a metrics mapping.
///
/// The core only stores the mapping; probe errors belong inside it.
pub trait FunctionProber: Send + Sync {
    fn probe(&self, url: &str) -> impl Future<Output = HashMap<String, Value>> + Send;
}
