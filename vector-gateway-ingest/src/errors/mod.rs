//! Error types for the vector gateway ingest.

use thiserror::Error;

use vector_gateway_repository::EngineError;

/// Errors that can occur during ingestion.
///
/// `ingest_batch` only returns an error when nothing was processed;
/// partial failures surface in the batch report instead.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The input was rejected before reaching the engine.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The engine failed and nothing (or nothing further) was processed.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

impl IngestError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

impl From<EngineError> for IngestError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ValidationError(msg) => Self::ValidationError(msg),
            other => Self::Unavailable(other.to_string()),
        }
    }
}
