//! Placeholder HTTP API.
//!
//! Thin request routing over the query engine; no design content beyond
//! exposing compare/search to clients. The `watch` route is reserved for
//! a future price-change notification consumer and answers
//! `not_implemented`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/compare?gtin=` | Price history for one gtin, newest first |
//! | `GET`  | `/search?q=` | Latest snapshot per (product, store) matching name |
//! | `POST` | `/watch` | Reserved; always `not_implemented` |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! Errors use the JSON body `{ "error": { "code", "message" } }`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::models::PriceRecord;
use crate::query;

#[derive(Clone)]
struct AppState {
    pool: Arc<SqlitePool>,
}

/// Starts the HTTP server on the configured bind address. Runs until the
/// process is terminated; the pool is shared with any concurrent ingest
/// runs.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::connect(config).await?;
    let state = AppState {
        pool: Arc::new(pool),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/compare", get(handle_compare))
        .route("/search", get(handle_search))
        .route("/watch", post(handle_watch))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("pricegrid API listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
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

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
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

// ============ GET /compare ============

#[derive(Deserialize)]
struct CompareParams {
    gtin: String,
}

#[derive(Serialize)]
struct RecordsResponse {
    records: Vec<PriceRecord>,
}

async fn handle_compare(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<RecordsResponse>, AppError> {
    if params.gtin.trim().is_empty() {
        return Err(bad_request("gtin must not be empty"));
    }
    let records = query::compare(&state.pool, &params.gtin)
        .await
        .map_err(|e| internal(e.to_string()))?;
    Ok(Json(RecordsResponse { records }))
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    limit: Option<i64>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<RecordsResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("q must not be empty"));
    }
    let limit = params.limit.unwrap_or(query::DEFAULT_SEARCH_LIMIT);
    let records = query::search(&state.pool, &params.q, limit)
        .await
        .map_err(|e| internal(e.to_string()))?;
    Ok(Json(RecordsResponse { records }))
}

// ============ POST /watch ============

async fn handle_watch() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(serde_json::json!({ "status": "not_implemented" })),
    )
}
