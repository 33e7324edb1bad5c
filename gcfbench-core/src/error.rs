//! Custom error types for gcfbench.
//!
//! This module defines explicit enum error types. No `Box<dyn Error>`,
//! no `anyhow::Result` in the library - all errors are strongly typed.
//!
//! Deployment and probe failures are not errors at this level: they are
//! recorded as data on the affected `FunctionInstance`. The variants here
//! cover structural misuse (invalid lifecycle transitions, duplicate
//! indices) and boundary failures (config files, results artifacts).

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the gcfbench harness.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Lifecycle error: {0}")]
    State(#[from] StateError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Artifact serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Validation errors for benchmark inputs and aggregated results.
/// Rejected at the boundary, before any state is mutated.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duplicate instance index: {index}")]
    DuplicateIndex { index: u32 },

    #[error("Base name cannot be empty")]
    EmptyBaseName,

    #[error("Invalid base name: {value} - {reason}")]
    InvalidBaseName { value: String, reason: String },

    #[error("Instance count must be at least 1, got {count}")]
    InvalidInstanceCount { count: u32 },

    #[error(
        "Duration fields disagree: {seconds}s vs {nanoseconds}ns \
         (expected to describe the same interval)"
    )]
    DurationMismatch { seconds: f64, nanoseconds: u64 },

    #[error("Inconsistent deployment record: {reason}")]
    InconsistentRecord { reason: String },
}

/// Lifecycle transition errors for the function instance state machine.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Cannot transition instance {index} from {from} to {to}")]
    InvalidTransition {
        index: u32,
        from: &'static str,
        to: &'static str,
    },

    #[error("Instance {index} has no names; call set_names before deploying")]
    NotNamed { index: u32 },

    #[error("Instance {index} ({name}) cannot be renamed after deployment started")]
    RenameAfterDeployment { index: u32, name: String },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;
