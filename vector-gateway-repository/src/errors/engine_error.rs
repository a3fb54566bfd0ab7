//! Engine error types.
//!
//! This module defines the error types that can occur during search engine operations.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Failed to establish connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The engine did not accept or complete a request.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Validation error (e.g., missing required fields).
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl EngineError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}
