//! Elasticsearch query builders.
//!
//! This module builds k-NN search bodies from query parameters.

use serde_json::{json, Value};

use vector_gateway_shared::KnnQuery;

/// Build the search body for a k-NN query.
///
/// The body uses:
/// - `knn` with the query vector, target field, and candidate pool size
/// - `size` to cap the returned hits at `k`
/// - `_source` to restrict each hit to the projected fields
pub fn build_knn_search_body(query: &KnnQuery) -> Value {
    json!({
        "knn": {
            "field": query.field,
            "query_vector": query.vector,
            "k": query.k,
            "num_candidates": query.num_candidates
        },
        "size": query.k,
        "_source": query.source_fields
    })
}
