// SPDX-License-Identifier: Apache-2.0

//! Function instance lifecycle tracking.
//!
//! Implements the per-instance lifecycle:
//! `Created → Named → {Deployed | DeployFailed} → [Tested]`.
//! Invalid transitions result in StateError. Deployment and probe failures
//! are recorded as data on the instance, never raised.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::deployment::{DeploymentRecord, DeploymentResult};
use crate::error::StateError;
use crate::types::BaseName;

/// Instance lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Instance exists but has not been named yet.
    Created,

    /// Names derived; ready for a deployment attempt.
    Named,

    /// Deployment succeeded; the function is reachable.
    Deployed,

    /// Deployment failed. Terminal.
    DeployFailed,

    /// The deployed function has been probed. Terminal.
    Tested,
}

impl LifecycleState {
    /// Get the state name for error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Named => "Named",
            Self::Deployed => "Deployed",
            Self::DeployFailed => "DeployFailed",
            Self::Tested => "Tested",
        }
    }

    /// Check if transition to the target state is valid.
    pub fn can_transition_to(&self, target: LifecycleState) -> bool {
        matches!(
            (self, target),
            (Self::Created, Self::Named)
                | (Self::Named, Self::Deployed)
                | (Self::Named, Self::DeployFailed)
                | (Self::Deployed, Self::Tested)
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Names derived from a base name for one instance ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct InstanceNames {
    base: BaseName,
    name: String,
    display_name: String,
}

/// A function under test, tracked from creation through deployment and
/// probing. Identity is the ordinal `index`; one benchmark run never holds
/// two instances with the same index.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInstance {
    index: u32,
    state: LifecycleState,
    names: Option<InstanceNames>,
    region: Option<String>,
    url: Option<String>,
    deployed: bool,
    /// Free-form provider metadata, stored opaque and never interpreted.
    details: HashMap<String, Value>,
    test_result: Option<HashMap<String, Value>>,
    error: Option<String>,
    deployment: Option<DeploymentResult>,
}

impl FunctionInstance {
    /// Create an instance with the given ordinal. All optional fields are
    /// absent and the names are unset until `set_names` is called.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            state: LifecycleState::Created,
            names: None,
            region: None,
            url: None,
            deployed: false,
            details: HashMap::new(),
            test_result: None,
            error: None,
            deployment: None,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn name(&self) -> Option<&str> {
        self.names.as_ref().map(|n| n.name.as_str())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.names.as_ref().map(|n| n.display_name.as_str())
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn deployed(&self) -> bool {
        self.deployed
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn details(&self) -> &HashMap<String, Value> {
        &self.details
    }

    pub fn test_result(&self) -> Option<&HashMap<String, Value>> {
        self.test_result.as_ref()
    }

    pub fn deployment(&self) -> Option<&DeploymentResult> {
        self.deployment.as_ref()
    }

    /// Derive and set `name` and `display_name` from a base name.
    ///
    /// Idempotent for the same base. Before a deployment attempt a different
    /// base overwrites the previous names (last write wins); once deployment
    /// has started, renaming is rejected.
    pub fn set_names(&mut self, base: &BaseName) -> Result<(), StateError> {
        if let Some(existing) = &self.names {
            if existing.base == *base {
                return Ok(());
            }
            if self.state != LifecycleState::Named {
                return Err(StateError::RenameAfterDeployment {
                    index: self.index,
                    name: existing.name.clone(),
                });
            }
        }

        self.names = Some(InstanceNames {
            base: base.clone(),
            name: base.instance_name(self.index),
            display_name: base.display_name(self.index),
        });

        if self.state == LifecycleState::Created {
            self.transition(LifecycleState::Named)?;
        }
        Ok(())
    }

    /// Record the outcome of the single deployment attempt.
    ///
    /// On success the reachable URL, region, and provider metadata are
    /// captured; on failure the reason is stored and `deployed` stays false.
    pub fn record_deployment(
        &mut self,
        result: DeploymentResult,
        details: HashMap<String, Value>,
    ) -> Result<(), StateError> {
        if self.names.is_none() {
            return Err(StateError::NotNamed { index: self.index });
        }

        match &result {
            DeploymentResult::Success {
                url, used_region, ..
            } => {
                self.transition(LifecycleState::Deployed)?;
                self.url = Some(url.clone());
                self.region = used_region.clone();
                self.deployed = true;
                self.details.extend(details);
            }
            DeploymentResult::Failure { error, used_region } => {
                self.transition(LifecycleState::DeployFailed)?;
                self.error = Some(error.clone());
                self.region = used_region.clone();
            }
        }

        self.deployment = Some(result);
        Ok(())
    }

    /// Store the metrics reported by the test collaborator.
    /// Only valid once the instance is deployed.
    pub fn record_test(&mut self, metrics: HashMap<String, Value>) -> Result<(), StateError> {
        self.transition(LifecycleState::Tested)?;
        self.test_result = Some(metrics);
        Ok(())
    }

    fn transition(&mut self, target: LifecycleState) -> Result<(), StateError> {
        if !self.state.can_transition_to(target) {
            return Err(StateError::InvalidTransition {
                index: self.index,
                from: self.state.name(),
                to: target.name(),
            });
        }

        tracing::debug!(
            index = self.index,
            from = self.state.name(),
            to = target.name(),
            "Lifecycle transition"
        );

        self.state = target;
        Ok(())
    }

    /// Flatten into the artifact entry shape: the seven-key deployment
    /// record plus the instance fields.
    pub fn to_entry(&self) -> InstanceEntry {
        let deployment = self
            .deployment
            .as_ref()
            .map(|d| d.to_record())
            .unwrap_or_default();

        InstanceEntry {
            index: self.index,
            name: self.name().map(String::from),
            display_name: self.display_name().map(String::from),
            state: self.state,
            deployed: self.deployed,
            deployment,
            details: self.details.clone(),
            test_result: self.test_result.clone(),
        }
    }
}

/// One entry of a persisted results artifact.
///
/// A superset of the deployment record shape: the seven stable keys are
/// flattened in, alongside the instance identity and probe results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub index: u32,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub state: LifecycleState,
    pub deployed: bool,
    #[serde(flatten)]
    pub deployment: DeploymentRecord,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_result: Option<HashMap<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::DeploymentDuration;
    use serde_json::json;

    fn base() -> BaseName {
        BaseName::new("bench").unwrap()
    }

    fn deployed_result() -> DeploymentResult {
        DeploymentResult::Success {
            url: "https://f.example".to_string(),
            used_region: Some("us-east1".to_string()),
            duration: Some(DeploymentDuration::from_seconds(1.5)),
            deploy_time: None,
        }
    }

    #[test]
    fn test_new_instance_is_unnamed() {
        let instance = FunctionInstance::new(0);
        assert_eq!(instance.state(), LifecycleState::Created);
        assert!(instance.name().is_none());
        assert!(instance.display_name().is_none());
        assert!(!instance.deployed());
    }

    #[test]
    fn test_set_names_derivation() {
        let mut instance = FunctionInstance::new(3);
        instance.set_names(&base()).unwrap();

        assert_eq!(instance.name(), Some("bench-003"));
        assert_eq!(
            instance.display_name(),
            Some("bench-gcf-performance-test-003")
        );
        assert_eq!(instance.state(), LifecycleState::Named);
    }

    #[test]
    fn test_set_names_idempotent() {
        let mut instance = FunctionInstance::new(3);
        instance.set_names(&base()).unwrap();
        instance.set_names(&base()).unwrap();
        assert_eq!(instance.name(), Some("bench-003"));
    }

    #[test]
    fn test_rename_before_deploy_overwrites() {
        let mut instance = FunctionInstance::new(3);
        instance.set_names(&base()).unwrap();
        instance.set_names(&BaseName::new("other").unwrap()).unwrap();
        assert_eq!(instance.name(), Some("other-003"));
    }

    #[test]
    fn test_rename_after_deploy_rejected() {
        let mut instance = FunctionInstance::new(3);
        instance.set_names(&base()).unwrap();
        instance
            .record_deployment(deployed_result(), HashMap::new())
            .unwrap();

        let err = instance
            .set_names(&BaseName::new("other").unwrap())
            .unwrap_err();
        assert!(matches!(err, StateError::RenameAfterDeployment { .. }));
        // Same base is still fine
        assert!(instance.set_names(&base()).is_ok());
    }

    #[test]
    fn test_deploy_before_naming_rejected() {
        let mut instance = FunctionInstance::new(0);
        let err = instance
            .record_deployment(deployed_result(), HashMap::new())
            .unwrap_err();
        assert!(matches!(err, StateError::NotNamed { .. }));
    }

    #[test]
    fn test_successful_deployment_sets_fields() {
        let mut instance = FunctionInstance::new(1);
        instance.set_names(&base()).unwrap();

        let mut details = HashMap::new();
        details.insert("revision".to_string(), json!("rev-001"));
        instance
            .record_deployment(deployed_result(), details)
            .unwrap();

        assert!(instance.deployed());
        assert_eq!(instance.url(), Some("https://f.example"));
        assert_eq!(instance.region(), Some("us-east1"));
        assert!(instance.error().is_none());
        assert_eq!(instance.details()["revision"], json!("rev-001"));
        assert_eq!(instance.state(), LifecycleState::Deployed);
    }

    #[test]
    fn test_failed_deployment_is_terminal() {
        let mut instance = FunctionInstance::new(1);
        instance.set_names(&base()).unwrap();
        instance
            .record_deployment(DeploymentResult::failure("quota exceeded"), HashMap::new())
            .unwrap();

        assert!(!instance.deployed());
        assert_eq!(instance.error(), Some("quota exceeded"));
        assert_eq!(instance.state(), LifecycleState::DeployFailed);

        // No second attempt and no probing after failure
        assert!(instance
            .record_deployment(deployed_result(), HashMap::new())
            .is_err());
        assert!(instance.record_test(HashMap::new()).is_err());
    }

    #[test]
    fn test_record_test_requires_deployment() {
        let mut instance = FunctionInstance::new(2);
        instance.set_names(&base()).unwrap();
        assert!(instance.record_test(HashMap::new()).is_err());

        instance
            .record_deployment(deployed_result(), HashMap::new())
            .unwrap();

        let mut metrics = HashMap::new();
        metrics.insert("cold_start_avg_ms".to_string(), json!(812.5));
        instance.record_test(metrics).unwrap();

        assert_eq!(instance.state(), LifecycleState::Tested);
        assert_eq!(
            instance.test_result().unwrap()["cold_start_avg_ms"],
            json!(812.5)
        );
    }

    #[test]
    fn test_entry_flattens_record_keys() {
        let mut instance = FunctionInstance::new(3);
        instance.set_names(&base()).unwrap();
        instance
            .record_deployment(deployed_result(), HashMap::new())
            .unwrap();

        let value = serde_json::to_value(instance.to_entry()).unwrap();
        assert_eq!(value["index"], json!(3));
        assert_eq!(value["name"], json!("bench-003"));
        assert_eq!(value["success"], json!(true));
        assert_eq!(value["url"], json!("https://f.example"));
        assert_eq!(value["error"], json!(null));
        assert_eq!(value["used_region"], json!("us-east1"));
    }

    #[test]
    fn test_entry_round_trip() {
        let mut instance = FunctionInstance::new(4);
        instance.set_names(&base()).unwrap();
        instance
            .record_deployment(DeploymentResult::failure("timeout"), HashMap::new())
            .unwrap();

        let entry = instance.to_entry();
        let encoded = serde_json::to_string(&entry).unwrap();
        let decoded: InstanceEntry = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, entry);
    }
}
