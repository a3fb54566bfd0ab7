//! # Vector Gateway Repository
//!
//! This crate provides traits and implementations for interacting with the
//! search engine. It includes definitions for errors, interfaces, managers
//! for index lifecycle and document operations, and a concrete
//! implementation for Elasticsearch.

pub mod elasticsearch;
pub mod errors;
pub mod interfaces;
pub mod managers;
pub mod types;

pub use elasticsearch::{ElasticsearchClient, EngineConfig};
pub use errors::EngineError;
pub use interfaces::SearchEngine;
pub use managers::{DocumentManager, IndexManager};
pub use types::{BulkItemResult, BulkSummary, IndexAck, WriteOutcome, WriteResult};
