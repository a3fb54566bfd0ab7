//! Result types for engine operations.

use serde::Serialize;

/// Acknowledgement of an index-ensure operation.
///
/// `created` is true only when the call itself created the index. Ensuring
/// an index that already exists is not an error; it yields `created: false`
/// with a message saying so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexAck {
    /// Whether this call created the index.
    pub created: bool,
    /// Context when the index already existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// How the engine classified a single-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// No document with this id existed before.
    Created,
    /// An existing document with the same id was replaced.
    Updated,
}

/// Result of a single-document write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    /// The index written to.
    pub index: String,
    /// The document's external id.
    pub id: String,
    /// Whether the write created or replaced the document.
    #[serde(rename = "result")]
    pub outcome: WriteOutcome,
}

/// Outcome of one item within a bulk write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemResult {
    /// The document's external id.
    pub id: String,
    /// Whether the write was accepted.
    pub success: bool,
    /// Engine-reported reason if the write was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a bulk write containing aggregate counts and individual results.
///
/// A rejected item does not abort the rest of the batch; callers inspect
/// `results` to handle partial failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of accepted writes.
    pub succeeded: usize,
    /// Number of rejected writes.
    pub failed: usize,
    /// Individual results in submission order.
    pub results: Vec<BulkItemResult>,
}

impl BulkSummary {
    /// The summary of an empty bulk request.
    pub fn empty() -> Self {
        Self::default()
    }
}
