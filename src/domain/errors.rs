//! Domain errors for the journey automation engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or loading a trigger catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read trigger catalog {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Catalog YAML is malformed
    #[error("Failed to parse trigger catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A trigger has an empty id
    #[error("Trigger id cannot be empty")]
    EmptyTriggerId,

    /// Two triggers share an id
    #[error("Duplicate trigger id: {0}")]
    DuplicateTriggerId(String),

    /// A trigger would fire without doing anything
    #[error("Trigger {0} has no actions")]
    NoActions(String),

    /// A known condition key has a value of the wrong type
    #[error("Invalid value for condition {condition}: expected {expected}, got {actual}")]
    InvalidConditionValue {
        /// Condition key
        condition: String,
        /// Expected value shape
        expected: &'static str,
        /// Offending value, JSON-encoded
        actual: String,
    },
}

/// Error reported by an automation listener.
///
/// The dispatcher logs these and keeps delivering to the remaining
/// listeners.
#[derive(Debug, Error)]
#[error("{listener}: {message}")]
pub struct ListenerError {
    /// Listener name
    pub listener: String,
    /// What went wrong
    pub message: String,
}

impl ListenerError {
    /// Error attributed to `listener`
    pub fn new(listener: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            message: message.into(),
        }
    }
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
