//! Error types for the lexicon webhook
//!
//! This module defines all error types used throughout the crate.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for webhook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the lexicon webhook
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (solver config, missing zone, missing secret fields)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret store errors
    #[error("Secret store error: {0}")]
    Secret(String),

    /// The lexicon CLI ran but reported a failure
    #[error("lexicon {action} failed: {message}")]
    Lexicon {
        /// Lexicon action (create, update, delete, list)
        action: String,
        /// Error message including captured output
        message: String,
    },

    /// An operation did not finish within its deadline
    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        /// What was running
        operation: String,
        /// The deadline that expired
        timeout: Duration,
    },

    /// Webhook protocol errors (malformed payload, unknown action)
    #[error("Invalid challenge payload: {0}")]
    Payload(String),

    /// Process spawn or pipe errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a secret store error
    pub fn secret(msg: impl Into<String>) -> Self {
        Self::Secret(msg.into())
    }

    /// Create a lexicon invocation error
    pub fn lexicon(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lexicon {
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Create a payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// Whether this error stems from invalid configuration rather than I/O
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
