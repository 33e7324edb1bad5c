// SPDX-License-Identifier: Apache-2.0

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern to ensure valid state by construction.
//! The base name is validated at creation time; instance and display names
//! are derived from it deterministically and can never be malformed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Marker segment inserted into display names so deployed test functions
/// are recognizable in the cloud console.
pub const DISPLAY_NAME_MARKER: &str = "gcf-performance-test";

/// Maximum base name length. Cloud function names are capped at 63 chars
/// and the derived name appends a separator plus a 3-digit ordinal.
const MAX_BASE_NAME_LEN: usize = 48;

/// Validated base name for a benchmark run.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 48 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseName(String);

impl BaseName {
    /// Create a new BaseName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ValidationError::EmptyBaseName);
        }

        if name.len() > MAX_BASE_NAME_LEN {
            return Err(ValidationError::InvalidBaseName {
                value: name.clone(),
                reason: format!("too long: {} chars (max {})", name.len(), MAX_BASE_NAME_LEN),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidBaseName {
                value: name,
                reason: "must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the deployable function name for an instance ordinal.
    /// Lower-cased, ordinal zero-padded to 3 digits.
    pub fn instance_name(&self, index: u32) -> String {
        format!("{}-{:03}", self.0, index).to_lowercase()
    }

    /// Derive the human-facing display name for an instance ordinal.
    pub fn display_name(&self, index: u32) -> String {
        format!("{}-{}-{:03}", self.0, DISPLAY_NAME_MARKER, index)
    }
}

impl fmt::Display for BaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for BaseName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BaseName> for String {
    fn from(name: BaseName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_valid() {
        assert!(BaseName::new("bench").is_ok());
        assert!(BaseName::new("my-run_01").is_ok());
        assert!(BaseName::new("TestFunction").is_ok());
    }

    #[test]
    fn test_base_name_invalid() {
        assert!(BaseName::new("").is_err());
        assert!(BaseName::new("a".repeat(49)).is_err());
        assert!(BaseName::new("bench name").is_err());
        assert!(BaseName::new("bench@3").is_err());
    }

    #[test]
    fn test_instance_name_derivation() {
        let base = BaseName::new("bench").unwrap();
        assert_eq!(base.instance_name(3), "bench-003");
        assert_eq!(base.instance_name(42), "bench-042");
        assert_eq!(base.instance_name(1000), "bench-1000");
    }

    #[test]
    fn test_instance_name_is_lowercased() {
        let base = BaseName::new("TestFunction").unwrap();
        assert_eq!(base.instance_name(1), "testfunction-001");
        // Display name keeps the original casing
        assert_eq!(
            base.display_name(1),
            "TestFunction-gcf-performance-test-001"
        );
    }

    #[test]
    fn test_display_name_derivation() {
        let base = BaseName::new("bench").unwrap();
        assert_eq!(base.display_name(3), "bench-gcf-performance-test-003");
    }
}
