//! Prometheus metrics for the cache layer
//!
//! Counters are labeled by cache layer name so the three named instances
//! (user-data, image-metadata, property-analysis) can be monitored
//! independently from a single scrape endpoint.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_gauge_vec, CounterVec, Encoder, GaugeVec, TextEncoder,
};

lazy_static! {
    /// Total cache hits per layer
    pub static ref CACHE_HITS_TOTAL: CounterVec = register_counter_vec!(
        "staycache_hits_total",
        "Total cache hits",
        &["cache"]
    ).unwrap();

    /// Total cache misses per layer
    pub static ref CACHE_MISSES_TOTAL: CounterVec = register_counter_vec!(
        "staycache_misses_total",
        "Total cache misses",
        &["cache"]
    ).unwrap();

    /// Total evictions per layer (capacity, expiry, and explicit removal)
    pub static ref CACHE_EVICTIONS_TOTAL: CounterVec = register_counter_vec!(
        "staycache_evictions_total",
        "Total cache evictions",
        &["cache"]
    ).unwrap();

    /// Current entry count per layer
    pub static ref CACHE_ENTRIES: GaugeVec = register_gauge_vec!(
        "staycache_entries",
        "Current number of cache entries",
        &["cache"]
    ).unwrap();
}

/// Render all registered metrics in Prometheus text exposition format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registered() {
        CACHE_HITS_TOTAL.with_label_values(&["test"]).inc();
        CACHE_ENTRIES.with_label_values(&["test"]).set(3.0);

        let output = gather_metrics();
        assert!(output.contains("staycache_hits_total"));
        assert!(output.contains("staycache_entries"));
    }
}
