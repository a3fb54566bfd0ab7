//! Elasticsearch implementation of the search engine.
//!
//! This module provides a concrete implementation of `SearchEngine`
//! using Elasticsearch as the backend.

mod client;
mod mappings;
mod queries;

pub use client::{ElasticsearchClient, EngineConfig};
