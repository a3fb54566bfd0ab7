//! Orchestrator module for the vector gateway ingest.
//!
//! Takes a mixed batch of documents, groups them by target index, and
//! loads each group with its own ensure/bulk/refresh cycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::IngestError;
use vector_gateway_repository::{
    BulkSummary, DocumentManager, IndexManager, SearchEngine, WriteResult,
};
use vector_gateway_shared::{IngestItem, MappingSpec, Similarity};

/// Configuration for the ingest orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    /// Similarity metric applied when a mapping is inferred.
    pub similarity: Similarity,
    /// When set, every index is ensured with this mapping instead of one
    /// inferred from the first document of its group.
    pub fixed_mapping: Option<MappingSpec>,
}

/// One document that could not be ingested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemFailure {
    /// The index the document was routed to.
    pub index_name: String,
    /// The document's external id.
    pub id: String,
    /// Why the document was not written.
    pub reason: String,
}

/// Aggregate outcome of a batch ingest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Number of items in the batch.
    pub total: usize,
    /// Number of documents written.
    pub succeeded: usize,
    /// Number of documents not written.
    pub failed: usize,
    /// One entry per failed document.
    pub failures: Vec<ItemFailure>,
}

/// Outcome of loading one per-index group.
enum GroupOutcome {
    /// The ensure/bulk/refresh cycle ran; the summary may still contain
    /// per-item rejections.
    Completed(BulkSummary),
    /// The group was rejected before reaching the engine.
    Rejected(String),
    /// The engine failed while the group was being loaded.
    EngineFailed(String),
}

/// Orchestrator that loads mixed batches into their target indices.
///
/// The orchestrator:
/// - Groups items by index, preserving submission order inside each group
/// - Ensures each index with an inferred or fixed mapping
/// - Bulk-writes and refreshes each group independently
pub struct IngestOrchestrator {
    engine: Arc<dyn SearchEngine>,
    config: OrchestratorConfig,
}

impl IngestOrchestrator {
    /// Create a new orchestrator with the default configuration.
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self {
            engine,
            config: OrchestratorConfig::default(),
        }
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(engine: Arc<dyn SearchEngine>, config: OrchestratorConfig) -> Self {
        Self { engine, config }
    }

    /// Group items by target index, keeping submission order inside each
    /// group.
    fn partition_by_index(items: Vec<IngestItem>) -> BTreeMap<String, Vec<IngestItem>> {
        let mut groups: BTreeMap<String, Vec<IngestItem>> = BTreeMap::new();
        for item in items {
            groups
                .entry(item.index_name.clone())
                .or_default()
                .push(item);
        }
        groups
    }

    /// The mapping a group's index is ensured with.
    ///
    /// Without a fixed mapping, dimensions are taken from the group's
    /// first document.
    fn mapping_for(&self, items: &[IngestItem]) -> Result<MappingSpec, String> {
        if let Some(mapping) = &self.config.fixed_mapping {
            return Ok(mapping.clone());
        }

        let first = &items[0];
        let mapping = MappingSpec::infer_from(&first.document, self.config.similarity);
        if mapping.vector_fields.is_empty() {
            return Err(format!(
                "document {} has no vector fields to derive a mapping from",
                first.id
            ));
        }

        Ok(mapping)
    }

    /// Check every item of a group against the group's mapping.
    fn check_items(mapping: &MappingSpec, items: &[IngestItem]) -> Result<(), String> {
        for item in items {
            if item.id.is_empty() {
                return Err("all items must have an id".to_string());
            }
            mapping
                .check_document(&item.document)
                .map_err(|reason| format!("item {}: {}", item.id, reason))?;
        }
        Ok(())
    }

    /// Load one per-index group: ensure the index, bulk-write the
    /// documents, refresh.
    #[instrument(skip(self, items), fields(index = %index, item_count = items.len()))]
    async fn load_group(&self, index: &str, items: Vec<IngestItem>) -> GroupOutcome {
        if index.is_empty() {
            let reason = "index name is required".to_string();
            warn!(reason = %reason, "Group rejected");
            return GroupOutcome::Rejected(reason);
        }

        let mapping = match self.mapping_for(&items) {
            Ok(mapping) => mapping,
            Err(reason) => {
                warn!(reason = %reason, "Group rejected");
                return GroupOutcome::Rejected(reason);
            }
        };

        if let Err(reason) = Self::check_items(&mapping, &items) {
            warn!(reason = %reason, "Group rejected");
            return GroupOutcome::Rejected(reason);
        }

        let index_manager = IndexManager::new(self.engine.clone());
        if let Err(e) = index_manager.ensure_index(index, &mapping).await {
            error!(error = %e, "Failed to ensure index");
            return GroupOutcome::EngineFailed(e.to_string());
        }

        let pairs: Vec<_> = items.into_iter().map(IngestItem::into_write_pair).collect();

        let documents = DocumentManager::new(self.engine.clone(), index);
        let summary = match documents.bulk_insert(&pairs).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Bulk write failed");
                return GroupOutcome::EngineFailed(e.to_string());
            }
        };

        // The writes are already in the engine at this point; a refresh
        // failure only delays their visibility.
        if let Err(e) = index_manager.refresh_index(index).await {
            error!(error = %e, "Refresh failed after bulk write");
            return GroupOutcome::EngineFailed(format!(
                "refresh failed after bulk write, documents may be delayed: {}",
                e
            ));
        }

        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Group loaded"
        );
        GroupOutcome::Completed(summary)
    }

    /// Ingest a mixed batch of documents.
    ///
    /// Items are grouped by target index and each group is loaded with its
    /// own ensure/bulk/refresh cycle. Groups fail independently: a rejected
    /// or failed group is reported in the result while the other groups
    /// still land.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - If at least one group completed (or the batch
    ///   was empty); partial failures are listed in `failures`
    /// * `Err(IngestError::ValidationError)` - If every group was rejected
    ///   before reaching the engine
    /// * `Err(IngestError::Unavailable)` - If no group completed and at
    ///   least one engine call failed
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn ingest_batch(&self, items: Vec<IngestItem>) -> Result<BatchReport, IngestError> {
        if items.is_empty() {
            return Ok(BatchReport {
                total: 0,
                succeeded: 0,
                failed: 0,
                failures: vec![],
            });
        }

        let total = items.len();
        let groups = Self::partition_by_index(items);
        let group_count = groups.len();

        let mut succeeded = 0;
        let mut failed = 0;
        let mut failures = Vec::new();
        let mut completed_groups = 0;
        let mut rejected_groups = 0;
        let mut first_reason: Option<String> = None;

        for (index, group) in groups {
            let ids: Vec<String> = group.iter().map(|item| item.id.clone()).collect();

            match self.load_group(&index, group).await {
                GroupOutcome::Completed(summary) => {
                    completed_groups += 1;
                    succeeded += summary.succeeded;
                    failed += summary.failed;
                    for result in summary.results {
                        if !result.success {
                            failures.push(ItemFailure {
                                index_name: index.clone(),
                                id: result.id,
                                reason: result
                                    .error
                                    .unwrap_or_else(|| "write rejected".to_string()),
                            });
                        }
                    }
                }
                GroupOutcome::Rejected(reason) => {
                    rejected_groups += 1;
                    failed += ids.len();
                    if first_reason.is_none() {
                        first_reason = Some(reason.clone());
                    }
                    for id in ids {
                        failures.push(ItemFailure {
                            index_name: index.clone(),
                            id,
                            reason: reason.clone(),
                        });
                    }
                }
                GroupOutcome::EngineFailed(reason) => {
                    failed += ids.len();
                    if first_reason.is_none() {
                        first_reason = Some(reason.clone());
                    }
                    for id in ids {
                        failures.push(ItemFailure {
                            index_name: index.clone(),
                            id,
                            reason: reason.clone(),
                        });
                    }
                }
            }
        }

        if completed_groups == 0 {
            let reason = first_reason.unwrap_or_else(|| "batch failed".to_string());
            if rejected_groups == group_count {
                return Err(IngestError::validation(reason));
            }
            return Err(IngestError::unavailable(reason));
        }

        info!(
            total = total,
            succeeded = succeeded,
            failed = failed,
            "Batch ingest completed"
        );

        Ok(BatchReport {
            total,
            succeeded,
            failed,
            failures,
        })
    }

    /// Ingest a single document: ensure its index, write it, refresh.
    #[instrument(skip(self, item), fields(index = %item.index_name, id = %item.id))]
    pub async fn ingest_one(&self, item: IngestItem) -> Result<WriteResult, IngestError> {
        if item.id.is_empty() {
            return Err(IngestError::validation("document id is required"));
        }

        let mapping = self
            .mapping_for(std::slice::from_ref(&item))
            .map_err(IngestError::validation)?;
        mapping
            .check_document(&item.document)
            .map_err(IngestError::validation)?;

        let index = item.index_name.clone();
        let index_manager = IndexManager::new(self.engine.clone());
        index_manager.ensure_index(&index, &mapping).await?;

        let (id, document) = item.into_write_pair();
        let documents = DocumentManager::new(self.engine.clone(), index.clone());
        let result = documents.insert_document(&id, &document).await?;

        index_manager.refresh_index(&index).await?;

        Ok(result)
    }
}
