// Cache module for user profile and stats records.
// Holds the TTL policy, entry costing, health metrics and the cache manager.

#![allow(dead_code, unused_imports)]

pub mod entry;
pub mod manager;
pub mod metrics;
pub mod ttl;

pub use entry::{CacheEntry, REPOSITORY_COST_WEIGHT};
pub use manager::CacheManager;
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use ttl::{TtlPolicy, compute_ttl};
