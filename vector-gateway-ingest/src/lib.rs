//! # Vector Gateway Ingest
//!
//! This crate provides the ingest orchestration for the vector gateway.
//!
//! ## Architecture
//!
//! The orchestrator takes a mixed batch of documents and:
//!
//! 1. **Partitions**: Groups items by target index, preserving order
//! 2. **Maps**: Derives (or applies) the index mapping for each group
//! 3. **Loads**: Ensures the index, bulk-writes the group, refreshes
//!
//! Groups fail independently; one bad index never blocks the others.

pub mod errors;
pub mod orchestrator;

pub use errors::IngestError;
pub use orchestrator::{BatchReport, IngestOrchestrator, ItemFailure, OrchestratorConfig};
