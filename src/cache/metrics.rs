// Cache health counters.
// Lock-free counters updated on every lookup, read as point-in-time snapshots.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide cache counters. Monotonic until restart.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    keys_added: AtomicU64,
    cost_added: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an entry weighing `cost` that the store admitted.
    pub fn record_store(&self, cost: u64) {
        self.keys_added.fetch_add(1, Ordering::Relaxed);
        self.cost_added.fetch_add(cost, Ordering::Relaxed);
    }

    /// Read all counters. Fields may come from slightly different instants.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        MetricsSnapshot {
            hits,
            misses,
            ratio: hit_ratio(hits, misses),
            keys_added: self.keys_added.load(Ordering::Relaxed),
            cost_added: self.cost_added.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of [`CacheMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Hit percentage, 0-100.
    pub ratio: f64,
    pub keys_added: u64,
    pub cost_added: u64,
}

/// `hits / (hits + misses) * 100`, or 0 before any lookup.
pub fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64 * 100.0
    }
}
