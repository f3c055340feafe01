//! Integration tests for the cached data store
//!
//! Covers the read-through/write-through contracts against both the
//! in-memory backend and a failing backend test double.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use staycache::cache::{keys, CacheLayers};
use staycache::config::CacheTuning;
use staycache::error::StoreError;
use staycache::store::{CachedDataStore, MemoryStore, RemoteStore};
use staycache::types::ImageRecord;

/// Backend double that can be flipped into a failing state and counts
/// fetches, for asserting on degrade paths and re-fetch behavior
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
    fetches: AtomicU64,
}

impl FlakyStore {
    fn fail(&self, on: bool) {
        self.failing.store(on, Ordering::SeqCst);
    }

    fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FlakyStore {
    async fn fetch_user_data(
        &self,
        user_id: &str,
        data_key: &str,
    ) -> Result<Option<Value>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend down".to_string()));
        }
        self.inner.fetch_user_data(user_id, data_key).await
    }

    async fn upsert_user_data(
        &self,
        user_id: &str,
        data_key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::WriteFailed("backend down".to_string()));
        }
        self.inner.upsert_user_data(user_id, data_key, value).await
    }

    async fn list_images(
        &self,
        user_id: &str,
        category: Option<&str>,
    ) -> Result<Vec<ImageRecord>, StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("backend down".to_string()));
        }
        self.inner.list_images(user_id, category).await
    }
}

fn flaky_store() -> (Arc<FlakyStore>, CachedDataStore<FlakyStore>) {
    let remote = Arc::new(FlakyStore::default());
    let caches = Arc::new(CacheLayers::new(&CacheTuning::default()));
    let store = CachedDataStore::new(remote.clone(), caches);
    (remote, store)
}

fn image(id: &str, user: &str, category: Option<&str>) -> ImageRecord {
    ImageRecord {
        id: id.to_string(),
        user_id: user.to_string(),
        category: category.map(str::to_string),
        url: format!("https://cdn.example.com/{}.jpg", id),
        size_bytes: 512,
        uploaded_at: Utc::now(),
    }
}

#[tokio::test]
async fn failed_write_never_reaches_the_cache() {
    let (remote, store) = flaky_store();

    store.set_user_data("u1", "settings", json!("old")).await.unwrap();

    remote.fail(true);
    let result = store.set_user_data("u1", "settings", json!("new")).await;
    assert!(matches!(result, Err(StoreError::WriteFailed(_))));

    // The cache still serves the last persisted value, never the failed one
    let cached = store.caches().user_data.get(&keys::user_data_key("u1", "settings"));
    assert_eq!(cached, Some(json!("old")));
    assert_eq!(store.get_user_data("u1", "settings").await, Some(json!("old")));
}

#[tokio::test]
async fn remote_miss_is_requeried_until_a_record_exists() {
    let (remote, store) = flaky_store();

    assert_eq!(store.get_user_data("u1", "settings").await, None);
    assert_eq!(store.get_user_data("u1", "settings").await, None);
    // No negative caching: both misses reached the backend
    assert_eq!(remote.fetch_count(), 2);

    remote
        .inner
        .upsert_user_data("u1", "settings", json!({"theme": "dark"}))
        .await
        .unwrap();

    // The record is visible on the very next read, and cached after it
    assert_eq!(
        store.get_user_data("u1", "settings").await,
        Some(json!({"theme": "dark"}))
    );
    assert_eq!(
        store.get_user_data("u1", "settings").await,
        Some(json!({"theme": "dark"}))
    );
    assert_eq!(remote.fetch_count(), 3);
}

#[tokio::test]
async fn remote_read_failure_degrades_to_absent() {
    let (remote, store) = flaky_store();
    remote.fail(true);

    assert_eq!(store.get_user_data("u1", "settings").await, None);
    // The failure was not cached as a value
    assert_eq!(store.caches().user_data.stats().size, 0);
}

#[tokio::test]
async fn image_listing_degrades_to_empty_on_outage() {
    let (remote, store) = flaky_store();
    remote.inner.add_image(image("a", "u1", Some("kitchen")));

    remote.fail(true);
    let images = store.get_images("u1", Some("kitchen")).await;
    assert!(images.is_empty());
    assert_eq!(store.caches().image_metadata.stats().size, 0);

    // Once the backend recovers the listing comes back and is cached
    remote.fail(false);
    let images = store.get_images("u1", Some("kitchen")).await;
    assert_eq!(images.len(), 1);
    assert!(store
        .caches()
        .image_metadata
        .has(&keys::image_metadata_key("u1", Some("kitchen"))));
}

#[tokio::test]
async fn outage_does_not_clobber_previously_cached_listings() {
    let (remote, store) = flaky_store();
    remote.inner.add_image(image("a", "u1", None));

    let first = store.get_images("u1", None).await;
    assert_eq!(first.len(), 1);

    // Cached listings keep serving through the outage
    remote.fail(true);
    let during_outage = store.get_images("u1", None).await;
    assert_eq!(during_outage.len(), 1);
}

#[tokio::test]
async fn invalidation_forces_refetch_only_for_that_user() {
    let (remote, store) = flaky_store();

    store.set_user_data("u1", "settings", json!(1)).await.unwrap();
    store.set_user_data("u2", "settings", json!(2)).await.unwrap();

    let fetches_before = remote.fetch_count();
    store.invalidate_user("u1");

    // u1 must go back to the remote, u2 is still served from cache
    store.get_user_data("u1", "settings").await;
    store.get_user_data("u2", "settings").await;
    assert_eq!(remote.fetch_count(), fetches_before + 1);
}

#[tokio::test]
async fn concurrent_misses_converge_on_the_fetched_value() {
    let remote = Arc::new(MemoryStore::new());
    remote
        .upsert_user_data("u1", "settings", json!({"theme": "dark"}))
        .await
        .unwrap();
    let caches = Arc::new(CacheLayers::new(&CacheTuning::default()));
    let store = Arc::new(CachedDataStore::new(remote, caches));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.get_user_data("u1", "settings").await
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), Some(json!({"theme": "dark"})));
    }

    // Both fetch-and-write racers end up with the same value cached once
    assert_eq!(
        store.caches().user_data.get(&keys::user_data_key("u1", "settings")),
        Some(json!({"theme": "dark"}))
    );
    assert_eq!(store.caches().user_data.stats().size, 1);
}
