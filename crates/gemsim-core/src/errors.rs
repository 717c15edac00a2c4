//! Unified error system for gemsim
//!
//! Only failures that happen outside a run surface here: parameter validation,
//! re-entrant run attempts, catalog import, configuration loading and the
//! analysis collaborator. Anything that goes wrong while a scenario is running
//! is captured as a step outcome and folded into the verdict instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unified error type for all gemsim operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum SimError {
    /// One or more declared parameters hold invalid values
    #[error("Validation failed: {}", summarize(errors))]
    Validation {
        /// Parameter key to error message
        errors: BTreeMap<String, String>,
    },

    /// Catalog payload was rejected as a whole
    #[error("Catalog import rejected: {message}")]
    CatalogImport {
        /// Why the payload was rejected
        message: String,
    },

    /// External collaborator call failed
    #[error("Collaborator error: {message}")]
    Collaborator {
        /// Error message reported by the collaborator boundary
        message: String,
    },

    /// Engine already has a run in flight
    #[error("Engine busy: scenario '{scenario_id}' is already running")]
    AlreadyRunning {
        /// Scenario currently occupying the engine
        scenario_id: String,
    },

    /// Resource not found
    #[error("Not found: {message}")]
    NotFound {
        /// What was not found
        message: String,
    },

    /// Invalid input
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },
}

fn summarize(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(key, message)| format!("{key}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl SimError {
    /// Create a validation error from a parameter error map
    pub fn validation(errors: BTreeMap<String, String>) -> Self {
        Self::Validation { errors }
    }

    /// Create a catalog import error
    pub fn catalog_import(message: impl Into<String>) -> Self {
        Self::CatalogImport {
            message: message.into(),
        }
    }

    /// Create a collaborator error
    pub fn collaborator(message: impl Into<String>) -> Self {
        Self::Collaborator {
            message: message.into(),
        }
    }

    /// Create an engine-busy error
    pub fn already_running(scenario_id: impl Into<String>) -> Self {
        Self::AlreadyRunning {
            scenario_id: scenario_id.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// Standard Result type for gemsim operations
pub type Result<T> = std::result::Result<T, SimError>;

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(err.to_string()),
            _ => Self::invalid(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SimError::invalid("test message");
        assert!(matches!(err, SimError::Invalid { .. }));
        assert_eq!(err.to_string(), "Invalid: test message");
    }

    #[test]
    fn test_validation_message_lists_every_key() {
        let mut errors = BTreeMap::new();
        errors.insert("NEWVAL".to_string(), "Must be at least 0".to_string());
        errors.insert("PPID".to_string(), "Value is required".to_string());

        let err = SimError::validation(errors);
        assert_eq!(
            err.to_string(),
            "Validation failed: NEWVAL: Must be at least 0; PPID: Value is required"
        );
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SimError::from(io_err);
        assert!(matches!(err, SimError::NotFound { .. }));
    }
}
