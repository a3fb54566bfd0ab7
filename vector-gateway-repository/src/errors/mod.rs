//! Error types for the vector gateway repository.

mod engine_error;

pub use engine_error::EngineError;
