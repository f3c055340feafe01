//! In-memory remote store implementation
//!
//! Backs the server binary when no hosted database is wired in, and gives
//! tests a deterministic [`RemoteStore`] to compose with the cache. Data
//! lives only for the process lifetime.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::RemoteStore;
use crate::error::StoreError;
use crate::types::ImageRecord;

/// Process-local [`RemoteStore`] backed by maps
#[derive(Default)]
pub struct MemoryStore {
    /// (user_id, data_key) -> payload
    user_data: RwLock<HashMap<(String, String), Value>>,

    /// user_id -> uploaded images
    images: RwLock<HashMap<String, Vec<ImageRecord>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an image record, keeping newest-first order per user
    pub fn add_image(&self, record: ImageRecord) {
        let mut images = self.images.write();
        let user_images = images.entry(record.user_id.clone()).or_default();
        user_images.insert(0, record);
    }

    /// Number of user-data records held
    pub fn user_data_len(&self) -> usize {
        self.user_data.read().len()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn fetch_user_data(
        &self,
        user_id: &str,
        data_key: &str,
    ) -> Result<Option<Value>, StoreError> {
        let data = self.user_data.read();
        Ok(data
            .get(&(user_id.to_string(), data_key.to_string()))
            .cloned())
    }

    async fn upsert_user_data(
        &self,
        user_id: &str,
        data_key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut data = self.user_data.write();
        data.insert((user_id.to_string(), data_key.to_string()), value);
        Ok(())
    }

    async fn list_images(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> Result<Vec<ImageRecord>, StoreError> {
        let images = self.images.read();
        let user_images = images.get(user_id).cloned().unwrap_or_default();

        Ok(match category {
            Some(cat) => user_images
                .into_iter()
                .filter(|img| img.category.as_deref() == Some(cat))
                .collect(),
            None => user_images,
        })
    }
}
