//! HTTP surface of the vector gateway.
//!
//! Exposes ingestion and k-NN search over a JSON HTTP API in front of the
//! search engine. Handlers stay thin: routing, body shapes, and status
//! mapping live here, everything else is delegated to the orchestrator
//! and the document manager.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/ingest/{index_name}` | Ingest one document into an index |
//! | `POST` | `/ingest/` | Ingest a batch, items routed by their own index name |
//! | `POST` | `/search/{index_name}` | k-NN search over an index |
//! | `GET`  | `/health` | Health check (engine liveness and version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "validation_error", "message": "document id is required" } }
//! ```
//!
//! Error codes: `validation_error` (400), `engine_unavailable` (500).
//! A batch that lands partially is not an error; it returns 200 with the
//! failed items listed in `errors`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::{Dependencies, GatewayConfig};
use crate::ServerError;
use vector_gateway_ingest::{IngestError, IngestOrchestrator, ItemFailure};
use vector_gateway_repository::{DocumentManager, EngineError, SearchEngine, WriteResult};
use vector_gateway_shared::{IngestItem, KnnQuery, ScoredHit, VectorDocument};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    /// The engine handle shared by every request.
    engine: Arc<dyn SearchEngine>,
    /// Index for batch items that carry no index name.
    default_index: String,
}

/// Run the gateway until a shutdown signal is received.
///
/// Binds the HTTP listener, serves requests, and closes the engine handle
/// on the way out.
///
/// # Returns
///
/// Returns `Ok(())` when the server shuts down, or an error if binding fails.
pub async fn run(config: &GatewayConfig, deps: Dependencies) -> Result<(), ServerError> {
    let state = AppState {
        engine: deps.engine.clone(),
        default_index: config.default_index.clone(),
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    deps.engine.close().await;
    info!("Gateway shutdown complete");

    Ok(())
}

/// Build the gateway router with all routes and the CORS layer.
fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ingest/", post(handle_ingest_batch))
        .route("/ingest/{index_name}", post(handle_ingest_document))
        .route("/search/{index_name}", post(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Received shutdown signal");
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human-readable message.
#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (`"validation_error"` or `"engine_unavailable"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 error for rejected requests.
fn validation_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "validation_error".to_string(),
        message: message.into(),
    }
}

/// Constructs a 500 error for failed engine calls.
fn engine_unavailable(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "engine_unavailable".to_string(),
        message: message.into(),
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ValidationError(msg) => validation_error(msg),
            other => engine_unavailable(other.to_string()),
        }
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::ValidationError(msg) => validation_error(msg),
            IngestError::Unavailable(msg) => engine_unavailable(msg),
        }
    }
}

// ============ GET /health ============

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: String,
    /// `"up"` when the engine answers a liveness ping, `"down"` otherwise.
    engine: String,
    /// The crate version from `Cargo.toml`.
    version: String,
}

/// Handler for `GET /health`.
///
/// Reports the gateway version and whether the engine answers a liveness
/// ping. This endpoint is used by load balancers and monitoring tools.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = if state.engine.ping().await {
        "up"
    } else {
        "down"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        engine: engine.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /ingest/{index_name} ============

/// JSON request body for `POST /ingest/{index_name}`.
#[derive(Debug, Deserialize)]
struct IngestDocumentBody {
    /// External document id.
    id: String,
    /// Remaining fields form the document, vectors included.
    #[serde(flatten)]
    document: VectorDocument,
}

/// JSON response body for `POST /ingest/{index_name}`.
#[derive(Debug, Serialize)]
struct IngestDocumentResponse {
    status: String,
    response: WriteResult,
}

/// Handler for `POST /ingest/{index_name}`.
///
/// Ensures the index exists, writes the document under its external id,
/// and refreshes so the write is immediately searchable. Writing an id a
/// second time overwrites the earlier document.
async fn handle_ingest_document(
    State(state): State<AppState>,
    Path(index_name): Path<String>,
    Json(body): Json<IngestDocumentBody>,
) -> Result<Json<IngestDocumentResponse>, AppError> {
    let item = IngestItem {
        index_name,
        id: body.id,
        document: body.document,
    };

    let orchestrator = IngestOrchestrator::new(state.engine.clone());
    let response = orchestrator.ingest_one(item).await?;

    Ok(Json(IngestDocumentResponse {
        status: "success".to_string(),
        response,
    }))
}

// ============ POST /ingest/ ============

/// One item of a `POST /ingest/` batch.
#[derive(Debug, Deserialize)]
struct BatchItemBody {
    /// Target index; items without one fall back to the default index.
    index_name: Option<String>,
    /// External document id.
    id: String,
    /// Remaining fields form the document, vectors included.
    #[serde(flatten)]
    document: VectorDocument,
}

/// JSON request body for `POST /ingest/`.
#[derive(Debug, Deserialize)]
struct IngestBatchBody {
    items: Vec<BatchItemBody>,
}

/// JSON response body for `POST /ingest/`.
#[derive(Serialize)]
struct IngestBatchResponse {
    /// `"success"` when every item landed, `"partial"` otherwise.
    status: String,
    message: String,
    succeeded: usize,
    failed: usize,
    /// One entry per failed item.
    errors: Vec<ItemFailure>,
}

/// Handler for `POST /ingest/`.
///
/// Items are routed by their own `index_name`; items without one fall
/// back to the configured default index. Per-index groups fail
/// independently, so a batch can land partially; that is still a 200
/// with the failed items listed in `errors`.
async fn handle_ingest_batch(
    State(state): State<AppState>,
    Json(body): Json<IngestBatchBody>,
) -> Result<Json<IngestBatchResponse>, AppError> {
    let items: Vec<IngestItem> = body
        .items
        .into_iter()
        .map(|item| IngestItem {
            index_name: item
                .index_name
                .unwrap_or_else(|| state.default_index.clone()),
            id: item.id,
            document: item.document,
        })
        .collect();

    let orchestrator = IngestOrchestrator::new(state.engine.clone());
    let report = orchestrator.ingest_batch(items).await?;

    let (status, message) = if report.failed == 0 {
        (
            "success".to_string(),
            format!("Ingested {} documents", report.succeeded),
        )
    } else {
        (
            "partial".to_string(),
            format!(
                "Ingested {} of {} documents",
                report.succeeded, report.total
            ),
        )
    };

    Ok(Json(IngestBatchResponse {
        status,
        message,
        succeeded: report.succeeded,
        failed: report.failed,
        errors: report.failures,
    }))
}

// ============ POST /search/{index_name} ============

/// JSON request body for `POST /search/{index_name}`.
#[derive(Debug, Deserialize)]
struct SearchBody {
    /// The query vector.
    query_vector: Vec<f32>,
    /// Vector field searched against.
    #[serde(default = "default_search_field")]
    field: String,
    /// Number of hits to return.
    #[serde(default = "default_k")]
    k: usize,
    /// Breadth of the candidate pool; defaults to ten times `k`.
    num_candidates: Option<usize>,
    /// Fields returned per hit; defaults to the id and the searched field.
    fields: Option<Vec<String>>,
}

fn default_search_field() -> String {
    "text_embedding".to_string()
}

fn default_k() -> usize {
    10
}

/// JSON response body for `POST /search/{index_name}`.
#[derive(Debug, Serialize)]
struct SearchResponse {
    hits: Vec<ScoredHit>,
}

/// Handler for `POST /search/{index_name}`.
///
/// Runs a k-NN query against the index. Only the query vector is
/// required; `field`, `k`, `num_candidates`, and the projection all have
/// defaults.
async fn handle_search(
    State(state): State<AppState>,
    Path(index_name): Path<String>,
    Json(body): Json<SearchBody>,
) -> Result<Json<SearchResponse>, AppError> {
    let mut query = KnnQuery::new(body.field, body.query_vector, body.k);
    if let Some(num_candidates) = body.num_candidates {
        query = query.with_num_candidates(num_candidates);
    }
    if let Some(fields) = body.fields {
        query = query.with_source_fields(fields);
    }

    let documents = DocumentManager::new(state.engine.clone(), index_name);
    let hits = documents.search_documents(&query).await?;

    Ok(Json(SearchResponse { hits }))
}
