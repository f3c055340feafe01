//! Request and response types for the staycache HTTP server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use staycache::cache::UnifiedCacheStats;
use staycache::types::ImageRecord;

// =============================================================================
// Storage API Types
// =============================================================================

/// Query parameters for `GET /api/v1/storage`
#[derive(Debug, Deserialize)]
pub struct StorageQuery {
    /// Owning user
    pub user_id: String,
    /// Record key within the user's namespace
    pub key: String,
}

/// Body for `PUT /api/v1/storage`
#[derive(Debug, Deserialize)]
pub struct StoragePutRequest {
    /// Owning user
    pub user_id: String,
    /// Record key within the user's namespace
    pub key: String,
    /// Opaque JSON payload to persist
    pub data: Value,
}

/// Response for a successful storage read
#[derive(Debug, Serialize)]
pub struct StorageGetResponse {
    /// The stored payload
    pub data: Value,
}

/// Response for a successful storage write
#[derive(Debug, Serialize)]
pub struct StoragePutResponse {
    pub success: bool,
}

// =============================================================================
// Image API Types
// =============================================================================

/// Query parameters for `GET /api/v1/images`
#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    /// Owning user
    pub user_id: String,
    /// Optional category filter
    #[serde(default)]
    pub category: Option<String>,
}

/// Image listing response
#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<ImageRecord>,
    pub count: usize,
}

// =============================================================================
// Cache Admin Types
// =============================================================================

/// Body for `POST /api/v1/cache/invalidate`
#[derive(Debug, Deserialize)]
pub struct InvalidateRequest {
    /// User whose cached entries should be dropped
    pub user_id: String,
}

/// Invalidation response
#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub success: bool,
    /// Entries removed across the user-data and image layers
    pub removed: usize,
}

// =============================================================================
// Health Types
// =============================================================================

/// Health payload with per-layer cache statistics
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
    pub cache: UnifiedCacheStats,
}

/// Generic error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
