//! Remote store seam and the cached data store
//!
//! [`RemoteStore`] is the boundary to the hosted key/value backend; the
//! concrete client (connection handling, retries) lives outside this
//! crate. [`CachedDataStore`] composes a [`RemoteStore`] with the cache
//! layers: read-through on gets, write-through on sets.

mod cached;
mod memory;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::types::ImageRecord;

pub use cached::CachedDataStore;
pub use memory::MemoryStore;

/// Boundary to the remote user-data backend
///
/// All methods are total over their domain from the cache's perspective;
/// failures are the backend's, surfaced as [`StoreError`]. Retry policy,
/// if any, belongs to implementations.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch one user-data record, `None` when no record exists
    async fn fetch_user_data(
        &self,
        user_id: &str,
        data_key: &str,
    ) -> Result<Option<Value>, StoreError>;

    /// Insert or overwrite one user-data record
    async fn upsert_user_data(
        &self,
        user_id: &str,
        data_key: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// List image metadata for a user, optionally filtered by category,
    /// newest first
    async fn list_images(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> Result<Vec<ImageRecord>, StoreError>;
}
