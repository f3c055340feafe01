//! HTTP handlers for the staycache server
//!
//! Handlers are thin adapters over [`CachedDataStore`]: the read path is
//! served from cache when possible, writes go through to the backend
//! before the cache is refreshed, and the health endpoint reports the
//! per-layer cache counters.

use super::types::*;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

use staycache::config::Config;
use staycache::store::{CachedDataStore, MemoryStore};

// =============================================================================
// Application State
// =============================================================================

/// Shared application state
///
/// The cache layers are owned through the data store and injected here,
/// one instance per logical namespace for the process lifetime. There is
/// no hidden global cache state.
pub struct AppState {
    /// Cache-fronted data store
    pub store: CachedDataStore<MemoryStore>,
    /// Server configuration
    pub config: Config,
}

// =============================================================================
// Storage Handlers
// =============================================================================

/// `GET /api/v1/storage?user_id=&key=`
pub async fn get_storage(
    State(state): State<Arc<AppState>>,
    Query(params): Query<StorageQuery>,
) -> impl IntoResponse {
    if params.user_id.is_empty() || params.key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "missing user_id or key".to_string(),
            }),
        )
            .into_response();
    }

    match state.store.get_user_data(&params.user_id, &params.key).await {
        Some(data) => Json(StorageGetResponse { data }).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "record not found".to_string(),
            }),
        )
            .into_response(),
    }
}

/// `PUT /api/v1/storage`
pub async fn put_storage(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StoragePutRequest>,
) -> impl IntoResponse {
    if body.user_id.is_empty() || body.key.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "missing user_id or key".to_string(),
            }),
        )
            .into_response();
    }

    match state
        .store
        .set_user_data(&body.user_id, &body.key, body.data)
        .await
    {
        Ok(()) => Json(StoragePutResponse { success: true }).into_response(),
        Err(e) => {
            error!(user_id = %body.user_id, key = %body.key, error = %e, "storage write failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

// =============================================================================
// Image Handlers
// =============================================================================

/// `GET /api/v1/images?user_id=&category=`
pub async fn get_images(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImagesQuery>,
) -> impl IntoResponse {
    if params.user_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "missing user_id".to_string(),
            }),
        )
            .into_response();
    }

    let images = state
        .store
        .get_images(&params.user_id, params.category.as_deref())
        .await;

    let count = images.len();
    Json(ImagesResponse { images, count }).into_response()
}

// =============================================================================
// Cache Admin Handlers
// =============================================================================

/// `POST /api/v1/cache/invalidate`
pub async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
    Json(body): Json<InvalidateRequest>,
) -> impl IntoResponse {
    let removed = state.store.invalidate_user(&body.user_id);
    debug!(user_id = %body.user_id, removed, "cache invalidated");
    Json(InvalidateResponse {
        success: true,
        removed,
    })
}

// =============================================================================
// Health & Metrics Handlers
// =============================================================================

/// `GET /health` — per-layer cache counters in a JSON health payload
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
        cache: state.store.caches().stats(),
    })
}

/// `GET /metrics` — Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if !state.config.monitoring.metrics_enabled {
        return (StatusCode::NOT_FOUND, String::new()).into_response();
    }
    staycache::metrics::gather_metrics().into_response()
}
