//! Integration tests for the cache layer
//!
//! Exercises the bounded-capacity, expiry, eviction, and accounting
//! behavior through the public API, including the sweeper lifecycle.

use std::sync::Arc;
use std::time::Duration;

use staycache::cache::{keys, CacheLayers, CacheManager};
use staycache::config::CacheTuning;
use tokio::time::sleep;

#[test]
fn capacity_is_never_exceeded_under_mixed_operations() {
    let cache: CacheManager<u64> = CacheManager::new("it_capacity", 5, Duration::from_secs(60));

    for i in 0..200u64 {
        cache.set(format!("k{}", i), i);
        if i % 3 == 0 {
            cache.get(&format!("k{}", i / 2));
        }
        if i % 7 == 0 {
            cache.remove(&format!("k{}", i / 3));
        }
        assert!(cache.len() <= 5, "size exceeded cap at iteration {}", i);
    }
}

#[tokio::test]
async fn expired_entry_behaves_as_absent_and_is_counted() {
    let cache: CacheManager<&str> = CacheManager::new("it_expiry", 10, Duration::from_secs(60));

    cache.set_with_ttl("volatile", "v", Duration::from_millis(100));
    assert_eq!(cache.get("volatile"), Some("v"));

    sleep(Duration::from_millis(150)).await;

    assert_eq!(cache.get("volatile"), None);
    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.size, 0);
}

#[tokio::test]
async fn eviction_picks_least_recently_accessed() {
    let cache: CacheManager<char> = CacheManager::new("it_lru", 2, Duration::from_secs(60));

    cache.set("a", 'a');
    sleep(Duration::from_millis(5)).await;
    cache.set("b", 'b');
    sleep(Duration::from_millis(5)).await;

    // Accessing A makes B the coldest entry
    assert_eq!(cache.get("a"), Some('a'));
    sleep(Duration::from_millis(5)).await;

    cache.set("c", 'c');

    assert_eq!(cache.get("b"), None, "B should have been evicted");
    assert_eq!(cache.get("a"), Some('a'));
    assert_eq!(cache.get("c"), Some('c'));
}

#[test]
fn hit_rate_is_hits_over_total_and_zero_when_idle() {
    let cache: CacheManager<u8> = CacheManager::new("it_hit_rate", 10, Duration::from_secs(60));
    assert_eq!(cache.stats().hit_rate, 0.0);

    cache.set("a", 1);
    for _ in 0..3 {
        cache.get("a");
    }
    cache.get("missing");

    let stats = cache.stats();
    assert_eq!(stats.hits, 3);
    assert_eq!(stats.misses, 1);
    assert!((stats.hit_rate - 0.75).abs() < 1e-9);
}

#[test]
fn clear_resets_stats_and_size() {
    let cache: CacheManager<u8> = CacheManager::new("it_clear", 10, Duration::from_secs(60));

    cache.set("a", 1);
    cache.set("b", 2);
    cache.get("a");
    cache.get("missing");
    cache.remove("b");

    cache.clear();

    let stats = cache.stats();
    assert_eq!(
        (stats.hits, stats.misses, stats.evictions, stats.size),
        (0, 0, 0, 0)
    );
    assert_eq!(stats.hit_rate, 0.0);
}

#[tokio::test]
async fn sweeper_removes_unaccessed_expired_keys() {
    let cache: Arc<CacheManager<u8>> = Arc::new(CacheManager::new(
        "it_sweeper",
        10,
        Duration::from_millis(30),
    ));

    cache.set("a", 1);
    cache.set("b", 2);
    cache.start_sweeper(Duration::from_millis(20));

    // Entries expire and the sweep removes them without any further access
    sleep(Duration::from_millis(120)).await;

    assert_eq!(cache.len(), 0);
    assert_eq!(cache.stats().evictions, 2);

    cache.destroy().await;
}

#[tokio::test]
async fn destroy_stops_sweeper_and_is_idempotent() {
    let cache: Arc<CacheManager<u8>> =
        Arc::new(CacheManager::new("it_destroy", 10, Duration::from_secs(60)));

    cache.set("a", 1);
    cache.start_sweeper(Duration::from_millis(10));

    cache.destroy().await;
    assert!(cache.is_empty());

    // A second destroy with no running sweeper is a no-op
    cache.destroy().await;

    // The cache remains usable after destroy
    cache.set("b", 2);
    assert_eq!(cache.get("b"), Some(2));
}

#[tokio::test]
async fn worked_example_scenario_matches_expected_counters() {
    let cache: CacheManager<u32> = CacheManager::new("it_example", 2, Duration::from_secs(1));

    cache.set("a", 1);
    sleep(Duration::from_millis(5)).await;
    cache.set("b", 2);
    sleep(Duration::from_millis(5)).await;
    assert_eq!(cache.len(), 2);

    assert_eq!(cache.get("a"), Some(1));
    assert_eq!(cache.stats().hits, 1);
    sleep(Duration::from_millis(5)).await;

    cache.set("c", 3);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);

    assert_eq!(cache.get("b"), None);
    assert_eq!(cache.get("c"), Some(3));

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.size, 2);
    assert!((stats.hit_rate - 0.667).abs() < 1e-3);
}

#[test]
fn layer_invalidation_is_scoped_per_user_and_namespace() {
    let layers = CacheLayers::new(&CacheTuning::default());

    layers
        .user_data
        .set(keys::user_data_key("u1", "settings"), serde_json::json!(1));
    layers
        .user_data
        .set(keys::user_data_key("u1", "profile"), serde_json::json!(2));
    layers
        .user_data
        .set(keys::user_data_key("u10", "settings"), serde_json::json!(3));
    layers
        .image_metadata
        .set(keys::image_metadata_key("u1", Some("kitchen")), vec![]);

    let removed = layers.invalidate_user("u1");
    assert_eq!(removed, 3);

    // No u1 key remains retrievable in either namespace
    assert!(!layers.user_data.has(&keys::user_data_key("u1", "settings")));
    assert!(!layers.user_data.has(&keys::user_data_key("u1", "profile")));
    assert!(!layers
        .image_metadata
        .has(&keys::image_metadata_key("u1", Some("kitchen"))));

    // A user whose id shares the prefix string is untouched
    assert!(layers.user_data.has(&keys::user_data_key("u10", "settings")));
}
