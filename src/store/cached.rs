//! Read-through/write-through data store
//!
//! Composes the cache layers with a [`RemoteStore`]. The cache lock is
//! never held across a remote await: the cache is consulted, released,
//! the remote call happens, then the result is written back. Two
//! concurrent misses for the same key may therefore both fetch and both
//! write; the second write wins, which is fine because remote data is
//! authoritative and idempotent to re-fetch.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::RemoteStore;
use crate::cache::{keys, CacheLayers};
use crate::error::StoreError;
use crate::types::ImageRecord;

/// Cache-fronted view of the remote user-data store
pub struct CachedDataStore<S: RemoteStore> {
    remote: Arc<S>,
    caches: Arc<CacheLayers>,
}

impl<S: RemoteStore> CachedDataStore<S> {
    /// Create a store over the given backend and cache layers
    pub fn new(remote: Arc<S>, caches: Arc<CacheLayers>) -> Self {
        Self { remote, caches }
    }

    /// The cache layers this store writes through
    pub fn caches(&self) -> &Arc<CacheLayers> {
        &self.caches
    }

    /// Read one user-data record, cache first
    ///
    /// A remote miss returns `None` without caching the absence, so a
    /// record created later is visible on the very next read. A remote
    /// read failure degrades to `None` with a warning rather than
    /// propagating.
    pub async fn get_user_data(&self, user_id: &str, data_key: &str) -> Option<Value> {
        let cache_key = keys::user_data_key(user_id, data_key);

        if let Some(value) = self.caches.user_data.get(&cache_key) {
            return Some(value);
        }

        match self.remote.fetch_user_data(user_id, data_key).await {
            Ok(Some(value)) => {
                self.caches.user_data.set(cache_key, value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(user_id, data_key, error = %e, "remote read failed, serving miss");
                None
            }
        }
    }

    /// Write one user-data record through to the backend
    ///
    /// The remote write happens first; the cache is refreshed only after
    /// it succeeds, so the cache can never get ahead of a failed write.
    pub async fn set_user_data(
        &self,
        user_id: &str,
        data_key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.remote
            .upsert_user_data(user_id, data_key, value.clone())
            .await?;

        let cache_key = keys::user_data_key(user_id, data_key);
        self.caches.user_data.set(cache_key, value);
        debug!(user_id, data_key, "user data written through");
        Ok(())
    }

    /// List a user's image metadata, cache first
    ///
    /// A remote failure presents as an empty listing rather than a hard
    /// error; the empty result is not cached.
    pub async fn get_images(&self, user_id: &str, category: Option<&str>) -> Vec<ImageRecord> {
        let cache_key = keys::image_metadata_key(user_id, category);

        if let Some(images) = self.caches.image_metadata.get(&cache_key) {
            return images;
        }

        match self.remote.list_images(user_id, category).await {
            Ok(images) => {
                self.caches.image_metadata.set(cache_key, images.clone());
                images
            }
            Err(e) => {
                warn!(user_id, ?category, error = %e, "remote image listing failed");
                Vec::new()
            }
        }
    }

    /// Drop every cached entry a user owns in the user-data and image
    /// layers, forcing a remote re-fetch on the next access
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        self.caches.invalidate_user(user_id)
    }
}
