//! Elasticsearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngine`
//! using the Elasticsearch Rust client.

use std::time::Duration;

use async_trait::async_trait;
use elasticsearch::{
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesRefreshParts},
    BulkParts, Elasticsearch, IndexParts, SearchParts,
};
use serde_json::{json, Value};
use tokio::sync::{RwLock, Semaphore, SemaphorePermit};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::elasticsearch::{mappings, queries};
use crate::errors::EngineError;
use crate::interfaces::SearchEngine;
use crate::types::{BulkItemResult, BulkSummary, IndexAck, WriteOutcome, WriteResult};
use vector_gateway_shared::{KnnQuery, MappingSpec, ScoredHit, VectorDocument};

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Default number of requests allowed in flight at once.
const DEFAULT_MAX_CONCURRENCY: usize = 32;

/// Connection settings for the Elasticsearch engine handle.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// The engine endpoint (e.g., "http://localhost:9200").
    pub endpoint: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Number of requests allowed in flight at once.
    pub max_concurrency: usize,
}

impl EngineConfig {
    /// Create a config with the default timeout and concurrency limit.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the concurrency limit.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// Elasticsearch client implementation.
///
/// Provides vector search capabilities using Elasticsearch as the backend.
/// The handle is intended to be created once per process and shared.
///
/// # Example
///
/// ```ignore
/// use vector_gateway_repository::elasticsearch::{ElasticsearchClient, EngineConfig};
///
/// let config = EngineConfig::new(Url::parse("http://localhost:9200")?);
/// let client = ElasticsearchClient::connect(config).await?;
///
/// let query = KnnQuery::new("text_embedding", vec![0.1, 0.2, 0.3], 10);
/// let hits = client.knn_search("listings", &query).await?;
/// ```
pub struct ElasticsearchClient {
    client: RwLock<Option<Elasticsearch>>,
    limiter: Semaphore,
    config: EngineConfig,
}

impl ElasticsearchClient {
    /// Connect to the engine described by `config`.
    ///
    /// The connection is verified with a liveness ping before the handle is
    /// returned.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, timeout, and concurrency settings
    ///
    /// # Returns
    ///
    /// * `Ok(ElasticsearchClient)` - A verified client handle
    /// * `Err(EngineError::ConnectionError)` - If setup fails or the engine
    ///   does not answer
    pub async fn connect(config: EngineConfig) -> Result<Self, EngineError> {
        let conn_pool = SingleNodeConnectionPool::new(config.endpoint.clone());
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| EngineError::connection(e.to_string()))?;

        let client = Self {
            client: RwLock::new(Some(Elasticsearch::new(transport))),
            limiter: Semaphore::new(config.max_concurrency),
            config,
        };

        if !client.ping().await {
            return Err(EngineError::connection(format!(
                "engine at {} did not answer the liveness ping",
                client.config.endpoint
            )));
        }

        info!(
            endpoint = %client.config.endpoint,
            timeout_secs = client.config.timeout.as_secs(),
            max_concurrency = client.config.max_concurrency,
            "Created Elasticsearch client"
        );

        Ok(client)
    }

    /// Clone the live transport handle out of the lock.
    ///
    /// Fails with `Unavailable` once `close` has taken the handle.
    async fn handle(&self) -> Result<Elasticsearch, EngineError> {
        self.client
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or_else(|| EngineError::unavailable("engine handle is closed"))
    }

    /// Acquire a request slot, waiting when all slots are in use.
    async fn slot(&self) -> Result<SemaphorePermit<'_>, EngineError> {
        self.limiter
            .acquire()
            .await
            .map_err(|_| EngineError::unavailable("engine request limiter is closed"))
    }

    /// Build the interleaved action/document lines for a bulk request.
    ///
    /// Lines come out in item order, so a later write to the same id lands
    /// after (and overwrites) an earlier one.
    fn bulk_action_lines(index: &str, items: &[(String, VectorDocument)]) -> Vec<Value> {
        let mut lines = Vec::with_capacity(items.len() * 2);
        for (id, document) in items {
            lines.push(json!({ "index": { "_index": index, "_id": id } }));
            lines.push(document.to_value());
        }
        lines
    }

    /// Pair each submitted item with its entry in the bulk response.
    ///
    /// The engine reports item outcomes positionally, in submission order.
    fn parse_bulk_summary(items: &[(String, VectorDocument)], response: &Value) -> BulkSummary {
        let empty = Vec::new();
        let entries = response
            .get("items")
            .and_then(|items| items.as_array())
            .unwrap_or(&empty);

        let mut results = Vec::with_capacity(items.len());
        let mut succeeded = 0;
        let mut failed = 0;

        for (position, (id, _)) in items.iter().enumerate() {
            let error = match entries.get(position).and_then(|entry| entry.get("index")) {
                Some(entry) => entry.get("error").map(|err| {
                    err.get("reason")
                        .and_then(|reason| reason.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| err.to_string())
                }),
                None => Some("missing bulk response entry".to_string()),
            };

            match error {
                Some(reason) => {
                    failed += 1;
                    results.push(BulkItemResult {
                        id: id.clone(),
                        success: false,
                        error: Some(reason),
                    });
                }
                None => {
                    succeeded += 1;
                    results.push(BulkItemResult {
                        id: id.clone(),
                        success: true,
                        error: None,
                    });
                }
            }
        }

        BulkSummary {
            total: items.len(),
            succeeded,
            failed,
            results,
        }
    }

    /// Parse a single search hit.
    ///
    /// A hit without an `_id` yields `None`; a missing `_source` yields an
    /// empty projection.
    fn parse_hit(hit: &Value) -> Option<ScoredHit> {
        let id = hit.get("_id")?.as_str()?.to_string();
        let score = hit.get("_score").and_then(|score| score.as_f64()).unwrap_or(0.0);
        let fields = hit.get("_source").cloned().unwrap_or_else(|| json!({}));

        Some(ScoredHit { id, score, fields })
    }

    /// Extract the scored hits from a search response, keeping the
    /// engine's score order. Hits without an `_id` are dropped.
    fn parse_search_hits(response: &Value) -> Vec<ScoredHit> {
        response
            .get("hits")
            .and_then(|hits| hits.get("hits"))
            .and_then(|hits| hits.as_array())
            .map(|entries| entries.iter().filter_map(Self::parse_hit).collect())
            .unwrap_or_default()
    }

    /// Classify a write from the engine's `result` field.
    fn parse_write_result(index: &str, id: &str, response: &Value) -> WriteResult {
        let outcome = match response.get("result").and_then(|result| result.as_str()) {
            Some("created") => WriteOutcome::Created,
            _ => WriteOutcome::Updated,
        };

        WriteResult {
            index: index.to_string(),
            id: id.to_string(),
            outcome,
        }
    }

    /// Check whether an error body reports that the index already exists.
    fn is_already_exists_error(body: &str) -> bool {
        serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("error")
                    .and_then(|err| err.get("type"))
                    .and_then(|kind| kind.as_str())
                    .map(|kind| kind == "resource_already_exists_exception")
            })
            .unwrap_or(false)
    }
}

#[async_trait]
impl SearchEngine for ElasticsearchClient {
    async fn ping(&self) -> bool {
        let client = match self.handle().await {
            Ok(client) => client,
            Err(_) => return false,
        };

        match client
            .ping()
            .request_timeout(self.config.timeout)
            .send()
            .await
        {
            Ok(response) => response.status_code().is_success(),
            Err(e) => {
                warn!(error = %e, "Liveness ping failed");
                false
            }
        }
    }

    async fn close(&self) {
        let mut guard = self.client.write().await;
        if guard.take().is_some() {
            info!("Elasticsearch client closed");
        }
    }

    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        let _slot = self.slot().await?;
        let client = self.handle().await?;

        let response = client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .request_timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            return Ok(true);
        }
        if status.as_u16() == 404 {
            return Ok(false);
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %error_body, "Index existence check failed");
        Err(EngineError::unavailable(format!(
            "Existence check failed with status {}: {}",
            status, error_body
        )))
    }

    async fn create_index(
        &self,
        index: &str,
        mapping: &MappingSpec,
    ) -> Result<IndexAck, EngineError> {
        let _slot = self.slot().await?;
        let client = self.handle().await?;

        let response = client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(mappings::index_create_body(mapping))
            .request_timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if status.is_success() {
            debug!(index = %index, "Index created");
            return Ok(IndexAck {
                created: true,
                message: None,
            });
        }

        let error_body = response.text().await.unwrap_or_default();

        // Two callers can race to create the same index; the loser's
        // failure must read as "already there", not as an error.
        if Self::is_already_exists_error(&error_body) {
            return Ok(IndexAck {
                created: false,
                message: Some("index already exists".to_string()),
            });
        }

        error!(status = %status, body = %error_body, "Index creation failed");
        Err(EngineError::unavailable(format!(
            "Index creation failed with status {}: {}",
            status, error_body
        )))
    }

    async fn refresh_index(&self, index: &str) -> Result<(), EngineError> {
        let _slot = self.slot().await?;
        let client = self.handle().await?;

        let response = client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .request_timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Refresh request failed");
            return Err(EngineError::unavailable(format!(
                "Refresh failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Index refreshed");
        Ok(())
    }

    async fn insert_document(
        &self,
        index: &str,
        id: &str,
        document: &VectorDocument,
    ) -> Result<WriteResult, EngineError> {
        let _slot = self.slot().await?;
        let client = self.handle().await?;

        let response = client
            .index(IndexParts::IndexId(index, id))
            .body(document.to_value())
            .request_timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(EngineError::unavailable(format!(
                "Index request failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        debug!(index = %index, id = %id, "Document indexed");
        Ok(Self::parse_write_result(index, id, &body))
    }

    async fn bulk_insert(
        &self,
        index: &str,
        items: &[(String, VectorDocument)],
    ) -> Result<BulkSummary, EngineError> {
        if items.is_empty() {
            return Ok(BulkSummary::empty());
        }

        let _slot = self.slot().await?;
        let client = self.handle().await?;

        let body: Vec<JsonBody<Value>> = Self::bulk_action_lines(index, items)
            .into_iter()
            .map(Into::into)
            .collect();

        let response = client
            .bulk(BulkParts::Index(index))
            .body(body)
            .request_timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(EngineError::unavailable(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let summary = Self::parse_bulk_summary(items, &response_body);
        debug!(
            index = %index,
            total = summary.total,
            failed = summary.failed,
            "Bulk write completed"
        );
        Ok(summary)
    }

    async fn knn_search(
        &self,
        index: &str,
        query: &KnnQuery,
    ) -> Result<Vec<ScoredHit>, EngineError> {
        let _slot = self.slot().await?;
        let client = self.handle().await?;

        let response = client
            .search(SearchParts::Index(&[index]))
            .body(queries::build_knn_search_body(query))
            .request_timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(EngineError::unavailable(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::unavailable(e.to_string()))?;

        Ok(Self::parse_search_hits(&response_body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(id: &str, value: Value) -> (String, VectorDocument) {
        (id.to_string(), serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_engine_config_defaults() {
        let endpoint = Url::parse("http://localhost:9200").unwrap();
        let config = EngineConfig::new(endpoint);

        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.max_concurrency, 32);
    }

    #[test]
    fn test_engine_config_overrides() {
        let endpoint = Url::parse("http://localhost:9200").unwrap();
        let config = EngineConfig::new(endpoint)
            .with_timeout(Duration::from_secs(5))
            .with_max_concurrency(4);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn test_bulk_action_lines_interleave() {
        let items = vec![
            pair("doc-1", json!({ "text_embedding": [0.1, 0.2] })),
            pair("doc-2", json!({ "text_embedding": [0.3, 0.4] })),
        ];

        let lines = ElasticsearchClient::bulk_action_lines("listings", &items);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["index"]["_index"], "listings");
        assert_eq!(lines[0]["index"]["_id"], "doc-1");
        assert_eq!(lines[1]["text_embedding"][0], 0.1);
        assert_eq!(lines[2]["index"]["_id"], "doc-2");
        assert_eq!(lines[3]["text_embedding"][0], 0.3);
    }

    #[test]
    fn test_bulk_action_lines_repeated_id_keeps_order() {
        let items = vec![
            pair("doc-1", json!({ "version": 1 })),
            pair("doc-1", json!({ "version": 2 })),
        ];

        let lines = ElasticsearchClient::bulk_action_lines("listings", &items);

        // The later write must come last so it wins
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["index"]["_id"], "doc-1");
        assert_eq!(lines[1]["version"], 1);
        assert_eq!(lines[2]["index"]["_id"], "doc-1");
        assert_eq!(lines[3]["version"], 2);
    }

    #[test]
    fn test_parse_bulk_summary_all_accepted() {
        let items = vec![
            pair("doc-1", json!({ "v": [0.1] })),
            pair("doc-2", json!({ "v": [0.2] })),
        ];
        let response = json!({
            "errors": false,
            "items": [
                { "index": { "_id": "doc-1", "result": "created", "status": 201 } },
                { "index": { "_id": "doc-2", "result": "updated", "status": 200 } }
            ]
        });

        let summary = ElasticsearchClient::parse_bulk_summary(&items, &response);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 0);
        assert!(summary.results.iter().all(|result| result.success));
    }

    #[test]
    fn test_parse_bulk_summary_partial_failure() {
        let items = vec![
            pair("doc-1", json!({ "v": [0.1] })),
            pair("doc-2", json!({ "v": [0.2] })),
        ];
        let response = json!({
            "errors": true,
            "items": [
                { "index": { "_id": "doc-1", "result": "created", "status": 201 } },
                {
                    "index": {
                        "_id": "doc-2",
                        "status": 400,
                        "error": {
                            "type": "mapper_parsing_exception",
                            "reason": "failed to parse field [v]"
                        }
                    }
                }
            ]
        });

        let summary = ElasticsearchClient::parse_bulk_summary(&items, &response);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(summary.results[0].success);
        assert!(!summary.results[1].success);
        assert_eq!(
            summary.results[1].error,
            Some("failed to parse field [v]".to_string())
        );
    }

    #[test]
    fn test_parse_bulk_summary_missing_entries() {
        let items = vec![
            pair("doc-1", json!({ "v": [0.1] })),
            pair("doc-2", json!({ "v": [0.2] })),
        ];
        let response = json!({
            "errors": false,
            "items": [
                { "index": { "_id": "doc-1", "result": "created", "status": 201 } }
            ]
        });

        let summary = ElasticsearchClient::parse_bulk_summary(&items, &response);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.results[1].error,
            Some("missing bulk response entry".to_string())
        );
    }

    #[test]
    fn test_parse_hit() {
        let hit = json!({
            "_id": "doc-1",
            "_score": 0.87,
            "_source": {
                "id": "doc-1",
                "text_embedding": [0.1, 0.2]
            }
        });

        let result = ElasticsearchClient::parse_hit(&hit).unwrap();

        assert_eq!(result.id, "doc-1");
        assert_eq!(result.score, 0.87);
        assert_eq!(result.fields["id"], "doc-1");
    }

    #[test]
    fn test_parse_hit_missing_source() {
        let hit = json!({ "_id": "doc-1", "_score": 0.5 });

        let result = ElasticsearchClient::parse_hit(&hit).unwrap();

        assert_eq!(result.id, "doc-1");
        assert_eq!(result.fields, json!({}));
    }

    #[test]
    fn test_parse_hit_without_id() {
        let hit = json!({ "_score": 0.5, "_source": {} });

        assert!(ElasticsearchClient::parse_hit(&hit).is_none());
    }

    #[test]
    fn test_parse_search_hits_keep_engine_order() {
        let response = json!({
            "hits": {
                "hits": [
                    { "_id": "doc-2", "_score": 0.9, "_source": { "id": "doc-2" } },
                    { "_id": "doc-7", "_score": 0.6, "_source": { "id": "doc-7" } },
                    { "_score": 0.5, "_source": {} },
                    { "_id": "doc-1", "_score": 0.2, "_source": { "id": "doc-1" } }
                ]
            }
        });

        let hits = ElasticsearchClient::parse_search_hits(&response);

        // Engine order (descending score) is kept; the id-less hit is dropped
        let ids: Vec<&str> = hits.iter().map(|hit| hit.id.as_str()).collect();
        assert_eq!(ids, vec!["doc-2", "doc-7", "doc-1"]);
        assert!(hits.windows(2).all(|pair| pair[0].score >= pair[1].score));
    }

    #[test]
    fn test_parse_search_hits_empty_result() {
        let response = json!({
            "hits": { "total": { "value": 0 }, "hits": [] }
        });

        assert!(ElasticsearchClient::parse_search_hits(&response).is_empty());
    }

    #[test]
    fn test_parse_write_result() {
        let created = json!({ "result": "created" });
        let updated = json!({ "result": "updated" });

        let result = ElasticsearchClient::parse_write_result("listings", "doc-1", &created);
        assert_eq!(result.outcome, WriteOutcome::Created);
        assert_eq!(result.index, "listings");
        assert_eq!(result.id, "doc-1");

        let result = ElasticsearchClient::parse_write_result("listings", "doc-1", &updated);
        assert_eq!(result.outcome, WriteOutcome::Updated);
    }

    #[test]
    fn test_is_already_exists_error() {
        let body = json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": "index [listings] already exists"
            },
            "status": 400
        })
        .to_string();

        assert!(ElasticsearchClient::is_already_exists_error(&body));
    }

    #[test]
    fn test_is_already_exists_error_other_type() {
        let body = json!({
            "error": { "type": "mapper_parsing_exception", "reason": "bad mapping" },
            "status": 400
        })
        .to_string();

        assert!(!ElasticsearchClient::is_already_exists_error(&body));
    }

    #[test]
    fn test_is_already_exists_error_non_json() {
        assert!(!ElasticsearchClient::is_already_exists_error(
            "upstream timed out"
        ));
    }
}
