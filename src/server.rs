//! HTTP search API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search?q=<term>` | Search the catalog; blank or missing `q` matches everything |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! A successful search returns the nested result array, one entry per
//! manuscript in shelf-mark order.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "search_unavailable", "message": "search engine returned 503 Service Unavailable" } }
//! ```
//!
//! | Failure | Status | Code |
//! |---------|--------|------|
//! | search engine unreachable, erroring or answering garbage | 503 | `search_unavailable` |
//! | catalog data violating the shelf-mark rules | 500 | `internal` |
//! | search deadline exceeded | 504 | `timeout` |
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the catalog front end
//! can be served from a different host.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sinai_search_core::error::SearchError;
use sinai_search_core::models::SearchResult;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::service::SearchService;

/// Builds the API router around a search service.
pub fn router(service: Arc<SearchService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(service)
}

/// Starts the HTTP server on `server.bind` and serves until the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let service = Arc::new(SearchService::from_config(config)?);
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!(
        bind = %config.server.bind,
        solr = %config.solr.base_url,
        "search API listening"
    );
    println!("Sinai Search listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        let (status, code) = match &err {
            SearchError::Engine(_) => (StatusCode::SERVICE_UNAVAILABLE, "search_unavailable"),
            SearchError::DataIntegrity(_) | SearchError::Aborted(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
            SearchError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %err, "search failed");
        }
        AppError {
            status,
            code,
            message: err.to_string(),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

/// Handler for `GET /search`.
///
/// The cached result is shared, so the response is serialized straight from
/// the `Arc` without copying it.
async fn handle_search(
    State(service): State<Arc<SearchService>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Arc<SearchResult>>, AppError> {
    let result = service.search(&params.q).await?;
    Ok(Json(result))
}
