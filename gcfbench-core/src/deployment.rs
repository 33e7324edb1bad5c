// SPDX-License-Identifier: Apache-2.0

//! Immutable deployment outcome model.
//!
//! A deployment attempt concludes in exactly one of two ways, so the outcome
//! is a two-variant value type rather than a bag of nullable fields: the
//! success/failure invariants (success implies a URL and no error, failure
//! implies an error) hold by construction. The flat seven-key record shape
//! used in results artifacts is a separate serde struct, `DeploymentRecord`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ValidationError;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Tolerance when checking that the seconds and nanoseconds fields of a
/// record describe the same elapsed interval.
const DURATION_TOLERANCE_SECS: f64 = 1e-6;

/// Elapsed deployment time, carried at two precisions.
///
/// The nanosecond count is authoritative; the float seconds value is a
/// convenience duplicate for consumers that do arithmetic in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDuration {
    seconds: f64,
    nanoseconds: u64,
}

impl DeploymentDuration {
    /// Derive both precisions from a single measured interval.
    pub fn from_duration(elapsed: Duration) -> Self {
        Self {
            seconds: elapsed.as_secs_f64(),
            nanoseconds: elapsed.as_nanos() as u64,
        }
    }

    /// Reconstruct from separately stored fields, rejecting disagreement.
    pub fn from_parts(seconds: f64, nanoseconds: u64) -> Result<Self, ValidationError> {
        let derived = nanoseconds as f64 / NANOS_PER_SEC;
        if (seconds - derived).abs() > DURATION_TOLERANCE_SECS {
            return Err(ValidationError::DurationMismatch {
                seconds,
                nanoseconds,
            });
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    /// Reconstruct from nanoseconds only, deriving the seconds duplicate.
    pub fn from_nanoseconds(nanoseconds: u64) -> Self {
        Self {
            seconds: nanoseconds as f64 / NANOS_PER_SEC,
            nanoseconds,
        }
    }

    /// Reconstruct from seconds only, deriving the nanosecond count.
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            seconds,
            nanoseconds: (seconds * NANOS_PER_SEC) as u64,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u64 {
        self.nanoseconds
    }
}

/// Outcome of one deployment attempt. Immutable, equality by value.
///
/// Constructed once, at the moment the attempt concludes, and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub enum DeploymentResult {
    /// The function was deployed and is reachable at `url`.
    Success {
        url: String,
        used_region: Option<String>,
        duration: Option<DeploymentDuration>,
        /// Human-readable timestamp of when the deployment completed.
        deploy_time: Option<String>,
    },
    /// The deployment failed with a provider-reported reason.
    Failure {
        error: String,
        used_region: Option<String>,
    },
}

impl DeploymentResult {
    /// Convenience constructor for a failed attempt.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
            used_region: None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Success { url, .. } => Some(url),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }

    pub fn used_region(&self) -> Option<&str> {
        match self {
            Self::Success { used_region, .. } | Self::Failure { used_region, .. } => {
                used_region.as_deref()
            }
        }
    }

    pub fn duration(&self) -> Option<DeploymentDuration> {
        match self {
            Self::Success { duration, .. } => *duration,
            Self::Failure { .. } => None,
        }
    }

    pub fn deploy_time(&self) -> Option<&str> {
        match self {
            Self::Success { deploy_time, .. } => deploy_time.as_deref(),
            Self::Failure { .. } => None,
        }
    }

    /// Flatten into the stable seven-key record shape used in artifacts.
    pub fn to_record(&self) -> DeploymentRecord {
        match self {
            Self::Success {
                url,
                used_region,
                duration,
                deploy_time,
            } => DeploymentRecord {
                success: true,
                url: Some(url.clone()),
                error: None,
                used_region: used_region.clone(),
                deployment_duration_seconds: duration.map(|d| d.seconds()),
                deployment_duration_nanoseconds: duration.map(|d| d.nanoseconds()),
                deploy_time: deploy_time.clone(),
            },
            Self::Failure { error, used_region } => DeploymentRecord {
                success: false,
                url: None,
                error: Some(error.clone()),
                used_region: used_region.clone(),
                deployment_duration_seconds: None,
                deployment_duration_nanoseconds: None,
                deploy_time: None,
            },
        }
    }
}

/// Serialized form of a deployment outcome.
///
/// Exactly seven keys, fixed and stable, suitable for JSON encoding.
/// Absent optionals serialize as `null`; none of the keys is ever skipped,
/// so every record in an artifact has the same shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
    pub used_region: Option<String>,
    pub deployment_duration_seconds: Option<f64>,
    pub deployment_duration_nanoseconds: Option<u64>,
    pub deploy_time: Option<String>,
}

impl TryFrom<DeploymentRecord> for DeploymentResult {
    type Error = ValidationError;

    /// Validate a raw record back into the two-variant outcome.
    ///
    /// When both duration fields are present they must agree within
    /// floating-point tolerance; when only one is present the other is
    /// derived from it.
    fn try_from(record: DeploymentRecord) -> Result<Self, ValidationError> {
        if record.success {
            let url = record.url.ok_or_else(|| ValidationError::InconsistentRecord {
                reason: "successful record is missing a url".to_string(),
            })?;
            if let Some(error) = record.error {
                return Err(ValidationError::InconsistentRecord {
                    reason: format!("successful record carries an error: {error}"),
                });
            }

            let duration = match (
                record.deployment_duration_seconds,
                record.deployment_duration_nanoseconds,
            ) {
                (Some(secs), Some(nanos)) => Some(DeploymentDuration::from_parts(secs, nanos)?),
                (None, Some(nanos)) => Some(DeploymentDuration::from_nanoseconds(nanos)),
                (Some(secs), None) => Some(DeploymentDuration::from_seconds(secs)),
                (None, None) => None,
            };

            Ok(Self::Success {
                url,
                used_region: record.used_region,
                duration,
                deploy_time: record.deploy_time,
            })
        } else {
            let error = record
                .error
                .ok_or_else(|| ValidationError::InconsistentRecord {
                    reason: "failed record is missing an error description".to_string(),
                })?;
            Ok(Self::Failure {
                error,
                used_region: record.used_region,
            })
        }
    }
}
