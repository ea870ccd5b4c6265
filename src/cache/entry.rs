// Cached user record.
// Pairs a profile with its derived stats, plus the capture time and lifetime.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::duration_secs;
use crate::github::Profile;
use crate::stats::Stats;

/// Cost charged per repository; dominates the weight of large accounts.
pub const REPOSITORY_COST_WEIGHT: u64 = 100;

/// Profile and stats for one user. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry {
    pub profile: Profile,
    pub stats: Stats,
    /// When the entry was stored.
    pub cached_at: DateTime<Utc>,
    /// Lifetime from `cached_at`.
    #[serde(rename = "ttl_seconds", with = "duration_secs")]
    pub ttl: Duration,
}

impl CacheEntry {
    /// Create an entry stamped with the current time.
    pub fn new(profile: Profile, stats: Stats, ttl: Duration) -> Self {
        Self {
            profile,
            stats,
            cached_at: Utc::now(),
            ttl,
        }
    }

    /// Memory weight used by the store's cost budget.
    pub fn cost(&self) -> u64 {
        let name_len = self.profile.name.as_deref().map_or(0, str::len);
        (self.profile.login.len() + name_len + self.stats.top_languages_label().len()) as u64
            + REPOSITORY_COST_WEIGHT * self.stats.repository_count as u64
    }

    /// Check whether the entry's lifetime has elapsed at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let elapsed = now
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);

        elapsed >= self.ttl
    }

    /// Check if the entry is still valid now.
    pub fn is_valid(&self) -> bool {
        !self.is_expired_at(Utc::now())
    }

    /// Time at which the entry stops being served.
    pub fn expires_at(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.cached_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Receipt score: public repos x3, followers x2, plus total stars.
    pub fn contribution_score(&self) -> u64 {
        self.profile.public_repos * 3 + self.profile.followers * 2 + self.stats.total_stars
    }
}
