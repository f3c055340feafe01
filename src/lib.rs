//! staycache - bounded in-process TTL caches for a rental-property data service
//!
//! This library provides:
//! - A bounded TTL cache with LRU eviction, hit/miss accounting, and a
//!   cancellable background sweep ([`cache::CacheManager`])
//! - Three tuned, independently-swept named instances ([`cache::CacheLayers`])
//! - Canonical namespaced cache keys with prefix invalidation ([`cache::keys`])
//! - A read-through/write-through data store over a remote key/value
//!   backend ([`store::CachedDataStore`])
//!
//! The `server` binary exposes the storage, image-listing, health, and
//! metrics endpoints that consume the cache.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

/// Prometheus metrics and telemetry
pub mod metrics;

// Re-export main types
pub use cache::{CacheLayers, CacheManager, CacheStatsSnapshot, UnifiedCacheStats};
pub use config::Config;
pub use error::{Error, Result, StoreError};
pub use store::{CachedDataStore, MemoryStore, RemoteStore};
