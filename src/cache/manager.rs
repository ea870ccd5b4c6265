// Adaptive cache manager.
// Serves user records from a cost-bounded TinyLFU store, refreshing them lazily once their TTL lapses.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use moka::Expiry;
use moka::future::Cache;
use tracing::{debug, info};

use crate::config::{ActivityWindows, Config};
use crate::error::{ReceiptError, Result};
use crate::github::{Profile, UpstreamFetcher};
use crate::stats::{Stats, StatsAggregator};

use super::entry::CacheEntry;
use super::metrics::{CacheMetrics, MetricsSnapshot};
use super::ttl::TtlPolicy;

/// Lets the store reclaim an entry once its own TTL has passed.
struct EntryExpiry;

impl Expiry<String, Arc<CacheEntry>> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Arc<CacheEntry>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Arc<CacheEntry>,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Username-keyed cache of profile + stats records.
///
/// Created once at startup and shared by handle. Concurrent misses on the
/// same username are not coalesced; each fetches and the last store wins.
pub struct CacheManager {
    store: Cache<String, Arc<CacheEntry>>,
    fetcher: Arc<dyn UpstreamFetcher>,
    aggregator: StatsAggregator,
    ttl_policy: TtlPolicy,
    metrics: CacheMetrics,
}

impl CacheManager {
    /// Build a cache from configuration.
    pub fn new(fetcher: Arc<dyn UpstreamFetcher>, config: &Config) -> Self {
        Self::with_policy(
            fetcher,
            config.ttl.clone(),
            config.activity.clone(),
            config.cache.max_cost,
        )
    }

    /// Build a cache with an explicit TTL policy and cost budget.
    pub fn with_policy(
        fetcher: Arc<dyn UpstreamFetcher>,
        ttl_policy: TtlPolicy,
        windows: ActivityWindows,
        max_cost: u64,
    ) -> Self {
        let store = Cache::builder()
            .max_capacity(max_cost)
            .weigher(|_key: &String, entry: &Arc<CacheEntry>| -> u32 {
                u32::try_from(entry.cost()).unwrap_or(u32::MAX)
            })
            .expire_after(EntryExpiry)
            .build();

        Self {
            store,
            aggregator: StatsAggregator::new(Arc::clone(&fetcher), windows),
            fetcher,
            ttl_policy,
            metrics: CacheMetrics::new(),
        }
    }

    pub fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl_policy
    }

    /// Return the record for `username`, fetching it on a miss or after expiry.
    ///
    /// Upstream errors are returned unchanged and leave the store untouched.
    pub async fn get_user_data(&self, username: &str) -> Result<Arc<CacheEntry>> {
        if let Some(entry) = self.store.get(username).await {
            if entry.is_valid() {
                self.metrics.record_hit();
                debug!(username, "cache hit");
                return Ok(entry);
            }
            debug!(username, "cache entry expired");
        }

        self.metrics.record_miss();
        debug!(username, "cache miss");

        let (profile, stats) = self.fetch_fresh(username).await?;
        let ttl = self.ttl_policy.compute_ttl(&profile);
        let entry = Arc::new(CacheEntry::new(profile, stats, ttl));
        let cost = entry.cost();

        self.store
            .insert(username.to_string(), Arc::clone(&entry))
            .await;

        // Admission is decided during maintenance; only admitted entries count.
        self.store.run_pending_tasks().await;
        if self.store.contains_key(username) {
            self.metrics.record_store(cost);
            info!(username, ttl_secs = ttl.as_secs(), cost, "cached user");
        } else {
            debug!(username, cost, "store rejected entry");
        }
        Ok(entry)
    }

    /// Snapshot of hit/miss counters.
    pub fn get_cache_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Approximate number of entries held by the store.
    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }

    /// Fetch the profile and aggregate stats concurrently; either failing fails both.
    async fn fetch_fresh(&self, username: &str) -> Result<(Profile, Stats)> {
        let now = Utc::now();

        let profile = self.fetcher.fetch_profile(username);
        let stats = async {
            let repos = self.fetcher.fetch_repositories(username).await?;
            Ok::<_, ReceiptError>(self.aggregator.aggregate(username, &repos, now).await)
        };

        tokio::try_join!(profile, stats)
    }
}
