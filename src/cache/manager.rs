//! Bounded TTL cache with LRU eviction
//!
//! Provides the core in-memory cache used by every layer:
//! - Hard entry-count cap enforced by evicting the least recently
//!   accessed entry before insert
//! - TTL expiry, discovered lazily on access and proactively by a
//!   background sweep task
//! - Hit/miss/eviction accounting exposed as a serializable snapshot
//! - Prefix-based bulk invalidation for namespaced keys
//!
//! All operations are synchronous and take the same write lock, so the
//! map is mutated by one caller at a time; the sweep task contends on
//! that lock as well. Reads mutate access metadata, so `get` and `has`
//! lock for writing too.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

use super::entry::CacheEntry;
use crate::metrics::{CACHE_ENTRIES, CACHE_EVICTIONS_TOTAL, CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL};

/// Lifetime counters for a cache instance
///
/// Counters accumulate for the full lifetime of the cache and are reset
/// only by an explicit [`CacheManager::clear`].
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Total cache hits
    pub hits: AtomicU64,

    /// Total cache misses
    pub misses: AtomicU64,

    /// Total evictions (capacity, expiry, and explicit removal)
    pub evictions: AtomicU64,
}

/// Point-in-time view of a cache's counters
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsSnapshot {
    /// Total cache hits
    pub hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Total evictions
    pub evictions: u64,
    /// Current entry count
    pub size: usize,
    /// hits / (hits + misses), 0.0 when no accesses have occurred
    pub hit_rate: f64,
}

/// Handle to a running sweep task
struct SweeperHandle {
    shutdown: broadcast::Sender<()>,
    task: JoinHandle<()>,
}

/// Bounded in-memory cache with TTL expiry and LRU eviction
///
/// Keys are canonical namespaced strings built by [`crate::cache::keys`];
/// values are opaque. One instance exists per logical namespace and lives
/// for the process lifetime; call [`CacheManager::destroy`] on shutdown to
/// stop the sweep task and drop the contents.
pub struct CacheManager<V: Clone> {
    /// Layer name, used as the metrics label and in log events
    name: &'static str,

    /// Hard cap on map cardinality
    max_entries: usize,

    /// TTL applied when `set` is called without an explicit one
    default_ttl: Duration,

    /// Cached entries
    entries: RwLock<HashMap<String, CacheEntry<V>>>,

    /// Lifetime counters
    stats: CacheStats,

    /// Background sweep task, present while running
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl<V: Clone> CacheManager<V> {
    /// Create a cache with the given capacity and default TTL
    pub fn new(name: &'static str, max_entries: usize, default_ttl: Duration) -> Self {
        assert!(max_entries > 0, "cache capacity must be non-zero");
        Self {
            name,
            max_entries,
            default_ttl,
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::default(),
            sweeper: Mutex::new(None),
        }
    }

    /// Layer name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Configured capacity
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Configured default TTL
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Insert or overwrite a value with the default TTL
    ///
    /// Always succeeds: capacity pressure is handled by evicting the least
    /// recently accessed entry, never by rejecting the insert.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Insert or overwrite a value with an entry-specific TTL
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut entries = self.entries.write();

        // The capacity check runs before the insert even when the key
        // already exists, so an overwrite at capacity still evicts.
        while entries.len() >= self.max_entries {
            if !self.evict_lru(&mut entries) {
                break;
            }
        }

        entries.insert(key, CacheEntry::new(value, ttl));
        CACHE_ENTRIES
            .with_label_values(&[self.name])
            .set(entries.len() as f64);
    }

    /// Look up a live value
    ///
    /// An expired entry is removed on discovery and counted as both a miss
    /// and an eviction. A live hit bumps the entry's access count and
    /// refreshes its recency.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.write();

        match entries.get_mut(key) {
            None => {
                self.record_miss();
                return None;
            }
            Some(entry) => {
                if !entry.is_expired() {
                    entry.touch();
                    let value = entry.data.clone();
                    self.record_hit();
                    return Some(value);
                }
            }
        }

        // Expired: remove on discovery, counted as a miss and an eviction
        entries.remove(key);
        CACHE_ENTRIES
            .with_label_values(&[self.name])
            .set(entries.len() as f64);
        self.record_miss();
        self.record_eviction(1);
        None
    }

    /// Check for a live entry without touching access metadata or stats
    ///
    /// Expired entries are lazily deleted here just as in `get`, but the
    /// deletion is not counted as an eviction and no miss is recorded.
    pub fn has(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        let expired = match entries.get(key) {
            None => return false,
            Some(entry) => entry.is_expired(),
        };

        if expired {
            entries.remove(key);
            CACHE_ENTRIES
                .with_label_values(&[self.name])
                .set(entries.len() as f64);
            false
        } else {
            true
        }
    }

    /// Remove a key, counting an eviction if it was present
    pub fn remove(&self, key: &str) -> bool {
        let mut entries = self.entries.write();
        let removed = entries.remove(key).is_some();
        if removed {
            CACHE_ENTRIES
                .with_label_values(&[self.name])
                .set(entries.len() as f64);
            self.record_eviction(1);
        }
        removed
    }

    /// Remove every entry whose key starts with `prefix`
    ///
    /// This is a linear collect-then-delete scan over the full key set, not
    /// an indexed lookup. At the configured capacities (<= 1000 entries per
    /// layer) the scan is cheap; a secondary user-id index would only pay
    /// off at much larger sizes. Returns the number of entries removed.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write();

        let matching: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();

        for key in &matching {
            entries.remove(key);
        }

        let removed = matching.len();
        if removed > 0 {
            CACHE_ENTRIES
                .with_label_values(&[self.name])
                .set(entries.len() as f64);
            self.record_eviction(removed as u64);
            debug!(cache = self.name, prefix, removed, "invalidated by prefix");
        }
        removed
    }

    /// Empty the map and reset all counters to zero
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.clear();
        self.stats.hits.store(0, Ordering::Relaxed);
        self.stats.misses.store(0, Ordering::Relaxed);
        self.stats.evictions.store(0, Ordering::Relaxed);
        CACHE_ENTRIES.with_label_values(&[self.name]).set(0.0);
    }

    /// Current entry count (including not-yet-swept expired entries)
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot of the lifetime counters
    pub fn stats(&self) -> CacheStatsSnapshot {
        let hits = self.stats.hits.load(Ordering::Relaxed);
        let misses = self.stats.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStatsSnapshot {
            hits,
            misses,
            evictions: self.stats.evictions.load(Ordering::Relaxed),
            size: self.len(),
            hit_rate,
        }
    }

    /// Remove every expired entry, counting each as an eviction
    ///
    /// This is the proactive half of expiry; it bounds staleness for keys
    /// that are never accessed again. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();

        if removed > 0 {
            CACHE_ENTRIES
                .with_label_values(&[self.name])
                .set(entries.len() as f64);
            self.record_eviction(removed as u64);
            debug!(cache = self.name, removed, "swept expired entries");
        }
        removed
    }

    /// Evict the entry with the smallest `last_accessed`
    ///
    /// Full O(n) scan by design; ties break on the first entry
    /// encountered. Cheap at the configured capacities, but a known
    /// scalability ceiling if `max_entries` were ever raised
    /// significantly. Returns false when the map is empty.
    fn evict_lru(&self, entries: &mut HashMap<String, CacheEntry<V>>) -> bool {
        let lru_key = entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        match lru_key {
            Some(key) => {
                entries.remove(&key);
                self.record_eviction(1);
                debug!(cache = self.name, key = %key, "evicted LRU entry");
                true
            }
            None => false,
        }
    }

    fn record_hit(&self) {
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        CACHE_HITS_TOTAL.with_label_values(&[self.name]).inc();
    }

    fn record_miss(&self) {
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        CACHE_MISSES_TOTAL.with_label_values(&[self.name]).inc();
    }

    fn record_eviction(&self, count: u64) {
        self.stats.evictions.fetch_add(count, Ordering::Relaxed);
        CACHE_EVICTIONS_TOTAL
            .with_label_values(&[self.name])
            .inc_by(count as f64);
    }
}

impl<V> CacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Start the periodic sweep task
    ///
    /// Spawns a tokio task that calls [`CacheManager::sweep_expired`] on a
    /// fixed interval until [`CacheManager::destroy`] is called. Requires a
    /// running tokio runtime. A second call while the sweeper is running is
    /// a no-op.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) {
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        let cache = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first
            // sweep happens one full interval after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        cache.sweep_expired();
                    }
                    _ = shutdown_rx.recv() => {
                        debug!(cache = cache.name, "sweeper stopped");
                        break;
                    }
                }
            }
        });

        *sweeper = Some(SweeperHandle {
            shutdown: shutdown_tx,
            task,
        });
        debug!(cache = self.name, ?interval, "sweeper started");
    }

    /// Stop the sweep task and clear the cache
    ///
    /// Waits for an in-flight sweep tick to finish before returning.
    /// Idempotent: calling this twice (or without a running sweeper) is
    /// safe.
    pub async fn destroy(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            let _ = handle.shutdown.send(());
            let _ = handle.task.await;
        }
        self.clear();
    }
}
