//! # Vector Gateway
//!
//! Main library for the vector search gateway.
//!
//! This crate provides the entry point, configuration, and HTTP surface
//! for running the gateway in front of the search engine.

pub mod config;
pub mod server;

pub use config::{Dependencies, GatewayConfig};

use thiserror::Error;

/// Errors that can occur during gateway initialization or execution.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
