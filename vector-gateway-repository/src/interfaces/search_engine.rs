//! Search engine trait definition.
//!
//! This module defines the abstract interface for search engine operations,
//! allowing for different backend implementations (Elasticsearch, OpenSearch, etc.).

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::types::{BulkSummary, IndexAck, WriteResult};
use vector_gateway_shared::{KnnQuery, MappingSpec, ScoredHit, VectorDocument};

/// Abstract interface for search engine operations.
///
/// This trait defines all the operations required to interact with a
/// vector-capable search engine. Implementations can be swapped for
/// different backends (Elasticsearch, mock, etc.) enabling easy testing
/// and potential future migrations.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Fallible methods return `Result<T, EngineError>` for consistent error
/// handling. `ping` and `close` never fail.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Check whether the engine is reachable and answering.
    ///
    /// # Returns
    ///
    /// * `true` - If the engine answered the liveness ping
    /// * `false` - If the engine is unreachable or the handle is closed
    async fn ping(&self) -> bool;

    /// Release the engine handle.
    ///
    /// Calling `close` more than once is harmless. Operations issued after
    /// the handle is closed fail with `EngineError::Unavailable`.
    async fn close(&self);

    /// Check whether an index exists.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index exists
    /// * `Ok(false)` - If the index does not exist
    /// * `Err(EngineError)` - If the check could not be answered
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    /// Create an index with the given mapping.
    ///
    /// If another caller created the index first, the result reports
    /// `created: false` rather than an error.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    /// * `mapping` - Field definitions the index is created with
    ///
    /// # Returns
    ///
    /// * `Ok(IndexAck)` - Whether this call created the index
    /// * `Err(EngineError)` - If creation fails
    async fn create_index(&self, index: &str, mapping: &MappingSpec)
        -> Result<IndexAck, EngineError>;

    /// Refresh an index so prior writes become visible to searches.
    ///
    /// # Arguments
    ///
    /// * `index` - The index name
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the refresh completed
    /// * `Err(EngineError)` - If the refresh fails
    async fn refresh_index(&self, index: &str) -> Result<(), EngineError>;

    /// Upsert a single document under its external id.
    ///
    /// If a document with the same id already exists, it will be replaced.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to write to
    /// * `id` - The document's external id
    /// * `document` - The document fields
    ///
    /// # Returns
    ///
    /// * `Ok(WriteResult)` - Whether the write created or replaced the document
    /// * `Err(EngineError)` - If the write fails
    async fn insert_document(
        &self,
        index: &str,
        id: &str,
        document: &VectorDocument,
    ) -> Result<WriteResult, EngineError>;

    /// Upsert multiple documents in a single bulk operation.
    ///
    /// This is more efficient than calling `insert_document` multiple
    /// times. Individual rejections are reported in the summary and do not
    /// abort the rest of the batch.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to write to
    /// * `items` - Pairs of external id and document, in write order
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Aggregate counts plus per-item outcomes
    /// * `Err(EngineError)` - If the bulk request itself fails
    async fn bulk_insert(
        &self,
        index: &str,
        items: &[(String, VectorDocument)],
    ) -> Result<BulkSummary, EngineError>;

    /// Execute a k-nearest-neighbor search against an index.
    ///
    /// # Arguments
    ///
    /// * `index` - The index to search
    /// * `query` - The query vector, field, and result shaping parameters
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ScoredHit>)` - Hits ordered by descending score
    /// * `Err(EngineError)` - If the search fails
    ///
    /// # Example
    ///
    /// ```ignore
    /// let query = KnnQuery::new("text_embedding", vec![0.1, 0.2, 0.3], 10);
    /// let hits = engine.knn_search("listings", &query).await?;
    /// println!("Found {} hits", hits.len());
    /// ```
    async fn knn_search(&self, index: &str, query: &KnnQuery)
        -> Result<Vec<ScoredHit>, EngineError>;
}
