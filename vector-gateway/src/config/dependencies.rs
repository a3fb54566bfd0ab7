//! Dependency initialization and wiring for the vector gateway.

use std::sync::Arc;

use tracing::info;

use crate::config::GatewayConfig;
use crate::ServerError;
use vector_gateway_repository::{ElasticsearchClient, EngineConfig, SearchEngine};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The engine handle shared by every request.
    pub engine: Arc<dyn SearchEngine>,
}

impl Dependencies {
    /// Initialize all dependencies from the resolved configuration.
    ///
    /// Connects to Elasticsearch and verifies the node answers a liveness
    /// ping before the server starts accepting requests.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ServerError)` - If the engine is unreachable
    pub async fn new(config: &GatewayConfig) -> Result<Self, ServerError> {
        info!(
            elasticsearch_url = %config.elasticsearch_url,
            default_index = %config.default_index,
            timeout_secs = config.timeout.as_secs(),
            "Initializing dependencies"
        );

        let engine_config = EngineConfig::new(config.elasticsearch_url.clone())
            .with_timeout(config.timeout)
            .with_max_concurrency(config.max_concurrent_connections);

        let engine = ElasticsearchClient::connect(engine_config)
            .await
            .map_err(|e| ServerError::config(format!("Failed to create Elasticsearch client: {}", e)))?;

        info!("Elasticsearch connection verified");

        Ok(Self {
            engine: Arc::new(engine),
        })
    }
}
