//! Index lifecycle manager.
//!
//! Ensures indices exist before writes and exposes refresh for
//! read-your-writes visibility.

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::EngineError;
use crate::interfaces::SearchEngine;
use crate::types::IndexAck;
use vector_gateway_shared::MappingSpec;

/// Manager for index lifecycle operations.
pub struct IndexManager {
    engine: Arc<dyn SearchEngine>,
}

impl IndexManager {
    /// Create a new index manager.
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }

    /// Ensure an index exists, creating it with `mapping` when absent.
    ///
    /// The operation is idempotent: ensuring an existing index never
    /// recreates it and never touches its mapping, even when `mapping`
    /// differs from the one the index was created with.
    pub async fn ensure_index(
        &self,
        index: &str,
        mapping: &MappingSpec,
    ) -> Result<IndexAck, EngineError> {
        if index.is_empty() {
            return Err(EngineError::validation("index name is required"));
        }

        if self.engine.index_exists(index).await? {
            debug!(index = %index, "Index already exists");
            return Ok(IndexAck {
                created: false,
                message: Some("index already exists".to_string()),
            });
        }

        let ack = self.engine.create_index(index, mapping).await?;
        if ack.created {
            info!(index = %index, "Index created");
        }
        Ok(ack)
    }

    /// Refresh an index so documents written before the call are visible
    /// to searches issued after it.
    pub async fn refresh_index(&self, index: &str) -> Result<(), EngineError> {
        if index.is_empty() {
            return Err(EngineError::validation("index name is required"));
        }

        self.engine.refresh_index(index).await
    }
}
