//! Managers for index lifecycle and document operations.
//!
//! Managers sit between callers and the `SearchEngine` trait: they
//! validate input before it reaches the engine and keep index handling
//! idempotent.

mod document_manager;
mod index_manager;

pub use document_manager::DocumentManager;
pub use index_manager::IndexManager;
