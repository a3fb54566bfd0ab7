//! k-NN query parameters and search hits.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Candidate pool multiplier applied when `num_candidates` is not given.
const DEFAULT_CANDIDATE_MULTIPLIER: usize = 10;

/// Parameters for a k-nearest-neighbor search.
///
/// `num_candidates` controls the candidate pool the engine scores before
/// returning the top `k`; larger pools trade latency for recall.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnQuery {
    /// The dense_vector field to search.
    pub field: String,
    /// The query vector.
    pub vector: Vec<f32>,
    /// Number of nearest neighbors to return.
    pub k: usize,
    /// Candidate pool size, at least `k`.
    pub num_candidates: usize,
    /// Fields projected into each hit.
    pub source_fields: Vec<String>,
}

impl KnnQuery {
    /// Create a query with the default candidate pool (10 x k, saturating
    /// at `usize::MAX`) and a projection of the id plus the searched field.
    pub fn new(field: impl Into<String>, vector: Vec<f32>, k: usize) -> Self {
        let field = field.into();
        let source_fields = vec!["id".to_string(), field.clone()];
        Self {
            num_candidates: k.saturating_mul(DEFAULT_CANDIDATE_MULTIPLIER),
            field,
            vector,
            k,
            source_fields,
        }
    }

    /// Override the candidate pool size.
    pub fn with_num_candidates(mut self, num_candidates: usize) -> Self {
        self.num_candidates = num_candidates;
        self
    }

    /// Override the projected fields.
    pub fn with_source_fields(mut self, fields: Vec<String>) -> Self {
        self.source_fields = fields;
        self
    }
}

/// One search hit: the document's external id, its similarity score, and
/// the projected source fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
    /// The document's external id.
    pub id: String,
    /// Engine-assigned similarity score.
    pub score: f64,
    /// Projected `_source` fields.
    pub fields: Value,
}
