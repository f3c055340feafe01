//! Named cache layers and unified statistics
//!
//! The three differently-tuned cache instances live here, explicitly
//! constructed and owned by whatever application context fronts them
//! (the server's `AppState` in the binary). There is no module-scope
//! global state; callers receive the layers by injection.
//!
//! Invalidation never crosses layers: user-data and image invalidation
//! each touch exactly one namespace, and `invalidate_user` composes the
//! two without reaching into property analyses.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::keys::{self, IMAGE_METADATA_PREFIX, USER_DATA_PREFIX};
use super::manager::{CacheManager, CacheStatsSnapshot};
use crate::config::CacheTuning;
use crate::types::ImageRecord;

/// Unified view of all cache layer statistics
///
/// Aggregated for the health payload; the overall hit rate is weighted by
/// access count across layers.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedCacheStats {
    /// User-data layer counters
    pub user_data: CacheStatsSnapshot,

    /// Image-metadata layer counters
    pub image_metadata: CacheStatsSnapshot,

    /// Property-analysis layer counters
    pub property_analysis: CacheStatsSnapshot,

    /// Total hits across all layers
    pub total_hits: u64,

    /// Total misses across all layers
    pub total_misses: u64,

    /// Access-weighted hit rate across all layers (0.0 to 1.0)
    pub overall_hit_rate: f64,
}

/// The three named cache instances
///
/// Tuned independently: user data is volatile (short TTL, larger cap),
/// image metadata rarely changes (long TTL), property analyses sit in
/// between. Layers are fully independent; there are no cross-layer
/// transactions.
pub struct CacheLayers {
    /// Per-user key/value data, written through on every update
    pub user_data: Arc<CacheManager<Value>>,

    /// Image metadata listings keyed by (user, category|all)
    pub image_metadata: Arc<CacheManager<Vec<ImageRecord>>>,

    /// Property analysis records keyed by (user, analysis|all)
    pub property_analysis: Arc<CacheManager<Value>>,

    /// Sweep interval shared by all layers
    sweep_interval: Duration,
}

impl CacheLayers {
    /// Construct all layers from configuration
    pub fn new(tuning: &CacheTuning) -> Self {
        Self {
            user_data: Arc::new(CacheManager::new(
                "user_data",
                tuning.user_data.max_entries,
                tuning.user_data.ttl(),
            )),
            image_metadata: Arc::new(CacheManager::new(
                "image_metadata",
                tuning.image_metadata.max_entries,
                tuning.image_metadata.ttl(),
            )),
            property_analysis: Arc::new(CacheManager::new(
                "property_analysis",
                tuning.property_analysis.max_entries,
                tuning.property_analysis.ttl(),
            )),
            sweep_interval: Duration::from_secs(tuning.sweep_interval_secs),
        }
    }

    /// Start the periodic sweep task on every layer
    ///
    /// Requires a running tokio runtime. Idempotent per layer.
    pub fn start_sweepers(&self) {
        self.user_data.start_sweeper(self.sweep_interval);
        self.image_metadata.start_sweeper(self.sweep_interval);
        self.property_analysis.start_sweeper(self.sweep_interval);
    }

    /// Stop all sweep tasks and clear every layer
    pub async fn shutdown(&self) {
        self.user_data.destroy().await;
        self.image_metadata.destroy().await;
        self.property_analysis.destroy().await;
    }

    /// Drop every user-data entry belonging to `user_id`
    pub fn invalidate_user_data(&self, user_id: &str) -> usize {
        self.user_data
            .invalidate_prefix(&keys::user_prefix(USER_DATA_PREFIX, user_id))
    }

    /// Drop every image-metadata entry belonging to `user_id`
    pub fn invalidate_image_cache(&self, user_id: &str) -> usize {
        self.image_metadata
            .invalidate_prefix(&keys::user_prefix(IMAGE_METADATA_PREFIX, user_id))
    }

    /// Drop a user's entries from the user-data and image layers
    ///
    /// Property analyses are left alone; they have their own lifecycle.
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        self.invalidate_user_data(user_id) + self.invalidate_image_cache(user_id)
    }

    /// Aggregate statistics across all layers
    pub fn stats(&self) -> UnifiedCacheStats {
        let user_data = self.user_data.stats();
        let image_metadata = self.image_metadata.stats();
        let property_analysis = self.property_analysis.stats();

        let total_hits = user_data.hits + image_metadata.hits + property_analysis.hits;
        let total_misses = user_data.misses + image_metadata.misses + property_analysis.misses;
        let total = total_hits + total_misses;
        let overall_hit_rate = if total > 0 {
            total_hits as f64 / total as f64
        } else {
            0.0
        };

        UnifiedCacheStats {
            user_data,
            image_metadata,
            property_analysis,
            total_hits,
            total_misses,
            overall_hit_rate,
        }
    }
}
