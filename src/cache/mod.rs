//! In-memory TTL cache layer
//!
//! Bounded caches with LRU eviction, lazy and proactive expiry, hit/miss
//! accounting, and structured namespaced keys with prefix invalidation.
//! Three tuned instances ([`CacheLayers`]) front the remote user-data
//! store through [`crate::store::CachedDataStore`].

pub mod entry;
pub mod keys;
pub mod layers;
pub mod manager;

pub use entry::CacheEntry;
pub use layers::{CacheLayers, UnifiedCacheStats};
pub use manager::{CacheManager, CacheStats, CacheStatsSnapshot};
