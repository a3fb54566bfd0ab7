//! # Vector Gateway Shared
//!
//! Shared data types for the vector gateway: documents, ingest items,
//! index mappings, and k-NN queries. These types carry no engine logic
//! and are used across the repository, ingest, and server crates.

pub mod document;
pub mod mapping;
pub mod query;

pub use document::{IngestItem, VectorDocument};
pub use mapping::{MappingSpec, Similarity, VectorFieldSpec};
pub use query::{KnnQuery, ScoredHit};
