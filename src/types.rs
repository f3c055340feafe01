//! Shared types for the data store layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata record for an uploaded image
///
/// This is what the remote store returns for image listings and what the
/// image-metadata cache holds (as `Vec<ImageRecord>` per user/category key).
/// The image bytes themselves never pass through this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Unique record identifier
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Optional grouping category (e.g. "exterior", "kitchen")
    pub category: Option<String>,
    /// Public URL of the stored image
    pub url: String,
    /// Stored size in bytes
    pub size_bytes: u64,
    /// Upload time
    pub uploaded_at: DateTime<Utc>,
}
