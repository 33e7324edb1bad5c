//! gcfbench Core Library
//!
//! Deployment-lifecycle tracking and results reporting for the gcfbench
//! serverless benchmark harness. Provides the function instance lifecycle
//! model, the immutable deployment result record, the results aggregator,
//! artifact persistence, and the textual results viewer.

pub mod aggregator;
pub mod artifact;
pub mod collab;
pub mod config;
pub mod deployment;
pub mod error;
pub mod instance;
pub mod types;
pub mod viewer;

// Re-export commonly used types
pub use aggregator::{ResultsAggregator, RunSummary};
pub use artifact::{ArtifactWriter, RunArtifact};
pub use collab::{DeployOutcome, DeployRequest, Deployer, FunctionProber};
pub use config::RunConfig;
pub use deployment::{DeploymentDuration, DeploymentRecord, DeploymentResult};
pub use error::{BenchError, BenchResult, StateError, ValidationError};
pub use instance::{FunctionInstance, InstanceEntry, LifecycleState};
pub use types::BaseName;
pub use viewer::ResultsViewer;
