//! Document manager bound to a single index.
//!
//! All writes and searches go through one named index; callers that work
//! with several indices hold one manager per index.

use std::sync::Arc;

use tracing::debug;

use crate::errors::EngineError;
use crate::interfaces::SearchEngine;
use crate::types::{BulkSummary, WriteResult};
use vector_gateway_shared::{KnnQuery, ScoredHit, VectorDocument};

/// Manager for document operations against one index.
pub struct DocumentManager {
    engine: Arc<dyn SearchEngine>,
    index: String,
}

impl DocumentManager {
    /// Create a manager bound to `index`.
    pub fn new(engine: Arc<dyn SearchEngine>, index: impl Into<String>) -> Self {
        Self {
            engine,
            index: index.into(),
        }
    }

    /// The index this manager writes to and searches.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Upsert a single document under its external id.
    ///
    /// Re-inserting an existing id replaces the previous document.
    pub async fn insert_document(
        &self,
        id: &str,
        document: &VectorDocument,
    ) -> Result<WriteResult, EngineError> {
        if id.is_empty() {
            return Err(EngineError::validation("document id is required"));
        }

        self.engine.insert_document(&self.index, id, document).await
    }

    /// Upsert a batch of documents in one bulk request.
    ///
    /// A rejected item does not abort the batch; per-item outcomes are
    /// reported in the returned summary.
    pub async fn bulk_insert(
        &self,
        items: &[(String, VectorDocument)],
    ) -> Result<BulkSummary, EngineError> {
        if items.is_empty() {
            return Ok(BulkSummary::empty());
        }

        for (id, _) in items {
            if id.is_empty() {
                return Err(EngineError::validation("all documents must have an id"));
            }
        }

        self.engine.bulk_insert(&self.index, items).await
    }

    /// Run a k-NN search, returning hits ordered by descending score.
    pub async fn search_documents(&self, query: &KnnQuery) -> Result<Vec<ScoredHit>, EngineError> {
        if query.field.is_empty() {
            return Err(EngineError::validation("query field is required"));
        }
        if query.vector.is_empty() {
            return Err(EngineError::validation("query vector must not be empty"));
        }
        if query.k == 0 {
            return Err(EngineError::validation("k must be at least 1"));
        }
        if query.num_candidates < query.k {
            return Err(EngineError::validation(format!(
                "num_candidates {} must be at least k {}",
                query.num_candidates, query.k
            )));
        }

        debug!(
            index = %self.index,
            field = %query.field,
            k = query.k,
            "Executing k-NN search"
        );
        self.engine.knn_search(&self.index, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BulkItemResult, IndexAck, WriteOutcome};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;
    use vector_gateway_shared::MappingSpec;

    /// Mock engine for testing.
    struct MockEngine {
        inserted: Mutex<Vec<(String, String)>>,
        bulk_calls: Mutex<Vec<(String, Vec<String>)>>,
        searches: Mutex<Vec<(String, KnnQuery)>>,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                inserted: Mutex::new(Vec::new()),
                bulk_calls: Mutex::new(Vec::new()),
                searches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchEngine for MockEngine {
        async fn ping(&self) -> bool {
            true
        }

        async fn close(&self) {}

        async fn index_exists(&self, _index: &str) -> Result<bool, EngineError> {
            Ok(true)
        }

        async fn create_index(
            &self,
            _index: &str,
            _mapping: &MappingSpec,
        ) -> Result<IndexAck, EngineError> {
            Ok(IndexAck {
                created: true,
                message: None,
            })
        }

        async fn refresh_index(&self, _index: &str) -> Result<(), EngineError> {
            Ok(())
        }

        async fn insert_document(
            &self,
            index: &str,
            id: &str,
            _document: &VectorDocument,
        ) -> Result<WriteResult, EngineError> {
            self.inserted
                .lock()
                .await
                .push((index.to_string(), id.to_string()));
            Ok(WriteResult {
                index: index.to_string(),
                id: id.to_string(),
                outcome: WriteOutcome::Created,
            })
        }

        async fn bulk_insert(
            &self,
            index: &str,
            items: &[(String, VectorDocument)],
        ) -> Result<BulkSummary, EngineError> {
            let ids: Vec<String> = items.iter().map(|(id, _)| id.clone()).collect();
            self.bulk_calls
                .lock()
                .await
                .push((index.to_string(), ids.clone()));
            Ok(BulkSummary {
                total: items.len(),
                succeeded: items.len(),
                failed: 0,
                results: ids
                    .into_iter()
                    .map(|id| BulkItemResult {
                        id,
                        success: true,
                        error: None,
                    })
                    .collect(),
            })
        }

        async fn knn_search(
            &self,
            index: &str,
            query: &KnnQuery,
        ) -> Result<Vec<ScoredHit>, EngineError> {
            self.searches
                .lock()
                .await
                .push((index.to_string(), query.clone()));
            Ok(vec![ScoredHit {
                id: "doc-1".to_string(),
                score: 0.9,
                fields: json!({ "id": "doc-1" }),
            }])
        }
    }

    fn doc(value: serde_json::Value) -> VectorDocument {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_insert_document() {
        let engine = Arc::new(MockEngine::new());
        let manager = DocumentManager::new(engine.clone(), "listings");

        let result = manager
            .insert_document("doc-1", &doc(json!({ "text_embedding": [0.1] })))
            .await
            .unwrap();

        assert_eq!(result.id, "doc-1");
        assert_eq!(result.outcome, WriteOutcome::Created);
        assert_eq!(
            *engine.inserted.lock().await,
            vec![("listings".to_string(), "doc-1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_insert_document_rejects_empty_id() {
        let manager = DocumentManager::new(Arc::new(MockEngine::new()), "listings");

        let result = manager
            .insert_document("", &doc(json!({ "text_embedding": [0.1] })))
            .await;

        assert!(matches!(
            result.unwrap_err(),
            EngineError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_bulk_insert_empty_skips_engine() {
        let engine = Arc::new(MockEngine::new());
        let manager = DocumentManager::new(engine.clone(), "listings");

        let summary = manager.bulk_insert(&[]).await.unwrap();

        assert_eq!(summary.total, 0);
        assert!(engine.bulk_calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_insert_rejects_missing_id() {
        let manager = DocumentManager::new(Arc::new(MockEngine::new()), "listings");

        let items = vec![
            ("doc-1".to_string(), doc(json!({ "v": [0.1] }))),
            ("".to_string(), doc(json!({ "v": [0.2] }))),
        ];
        let result = manager.bulk_insert(&items).await;

        assert!(matches!(
            result.unwrap_err(),
            EngineError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_bulk_insert_passes_through() {
        let engine = Arc::new(MockEngine::new());
        let manager = DocumentManager::new(engine.clone(), "listings");

        let items = vec![
            ("doc-1".to_string(), doc(json!({ "v": [0.1] }))),
            ("doc-2".to_string(), doc(json!({ "v": [0.2] }))),
        ];
        let summary = manager.bulk_insert(&items).await.unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);

        let calls = engine.bulk_calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "listings");
        assert_eq!(calls[0].1, vec!["doc-1".to_string(), "doc-2".to_string()]);
    }

    #[tokio::test]
    async fn test_search_documents() {
        let engine = Arc::new(MockEngine::new());
        let manager = DocumentManager::new(engine.clone(), "listings");

        let query = KnnQuery::new("text_embedding", vec![0.1, 0.2], 10);
        let hits = manager.search_documents(&query).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "doc-1");

        let searches = engine.searches.lock().await;
        assert_eq!(searches[0].0, "listings");
        assert_eq!(searches[0].1.num_candidates, 100);
    }

    #[tokio::test]
    async fn test_search_documents_rejects_empty_field() {
        let manager = DocumentManager::new(Arc::new(MockEngine::new()), "listings");

        let query = KnnQuery::new("", vec![0.1], 10);
        let result = manager.search_documents(&query).await;

        assert!(matches!(
            result.unwrap_err(),
            EngineError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_search_documents_rejects_empty_vector() {
        let manager = DocumentManager::new(Arc::new(MockEngine::new()), "listings");

        let query = KnnQuery::new("text_embedding", vec![], 10);
        let result = manager.search_documents(&query).await;

        assert!(matches!(
            result.unwrap_err(),
            EngineError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_search_documents_rejects_zero_k() {
        let manager = DocumentManager::new(Arc::new(MockEngine::new()), "listings");

        let query = KnnQuery::new("text_embedding", vec![0.1], 0).with_num_candidates(10);
        let result = manager.search_documents(&query).await;

        assert!(matches!(
            result.unwrap_err(),
            EngineError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_search_documents_rejects_small_candidate_pool() {
        let manager = DocumentManager::new(Arc::new(MockEngine::new()), "listings");

        let query = KnnQuery::new("text_embedding", vec![0.1], 10).with_num_candidates(5);
        let result = manager.search_documents(&query).await;

        let reason = result.unwrap_err().to_string();
        assert!(reason.contains("num_candidates 5"));
        assert!(reason.contains("k 10"));
    }
}
