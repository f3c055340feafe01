//! Cache entry value object

use std::time::{Duration, Instant};

/// A cached value with TTL and access tracking
///
/// Wraps the opaque cached data with the timing information needed for
/// expiry checks and LRU eviction. `last_accessed` is the recency signal
/// the eviction scan keys on; `access_count` is bookkeeping exposed for
/// diagnostics only.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value, opaque to the cache
    pub data: T,
    /// Creation (or last refresh) time, set on every insert
    pub created_at: Instant,
    /// Entry-specific time-to-live
    pub ttl: Duration,
    /// Incremented on every successful get
    pub access_count: u64,
    /// Updated on every successful get; eviction recency signal
    pub last_accessed: Instant,
}

impl<T> CacheEntry<T> {
    /// Create a fresh entry with zero accesses
    pub fn new(data: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed: now,
        }
    }

    /// An entry is live iff its age has not exceeded its TTL. Once this
    /// returns true the entry must behave as absent and be removed by
    /// whichever access or sweep discovers it, never served.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }

    /// Record an access: bump the counter and refresh recency
    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed = Instant::now();
    }

    /// Remaining TTL, zero once expired
    pub fn remaining_ttl(&self) -> Duration {
        self.ttl.saturating_sub(self.created_at.elapsed())
    }
}
