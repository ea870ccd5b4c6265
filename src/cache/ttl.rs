// TTL policy for cached user data.
// Maps a profile's popularity signals to how long its record stays fresh.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::duration_secs;
use crate::github::Profile;

/// Followers above this mark an account as popular.
pub const POPULAR_FOLLOWERS_THRESHOLD: u64 = 1000;
/// Public repositories above this mark an account as popular.
pub const POPULAR_REPOS_THRESHOLD: u64 = 50;
/// An account with no repositories and fewer followers than this is inactive.
pub const INACTIVE_FOLLOWERS_THRESHOLD: u64 = 10;

/// Popular accounts churn faster: 15 minutes.
pub const POPULAR_TTL: Duration = Duration::from_secs(15 * 60);
/// Inactive accounts rarely change: 2 hours.
pub const INACTIVE_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// Everyone else: 30 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Overridable thresholds and lifetimes. Defaults are the constants above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtlPolicy {
    pub popular_followers: u64,
    pub popular_repos: u64,
    pub inactive_followers: u64,
    #[serde(with = "duration_secs")]
    pub popular_ttl: Duration,
    #[serde(with = "duration_secs")]
    pub inactive_ttl: Duration,
    #[serde(with = "duration_secs")]
    pub default_ttl: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            popular_followers: POPULAR_FOLLOWERS_THRESHOLD,
            popular_repos: POPULAR_REPOS_THRESHOLD,
            inactive_followers: INACTIVE_FOLLOWERS_THRESHOLD,
            popular_ttl: POPULAR_TTL,
            inactive_ttl: INACTIVE_TTL,
            default_ttl: DEFAULT_TTL,
        }
    }
}

impl TtlPolicy {
    /// Lifetime of a freshly fetched record for `profile`.
    pub fn compute_ttl(&self, profile: &Profile) -> Duration {
        if profile.followers > self.popular_followers || profile.public_repos > self.popular_repos {
            return self.popular_ttl;
        }

        if profile.public_repos == 0 && profile.followers < self.inactive_followers {
            return self.inactive_ttl;
        }

        self.default_ttl
    }
}

/// [`TtlPolicy::compute_ttl`] with the default policy.
pub fn compute_ttl(profile: &Profile) -> Duration {
    TtlPolicy::default().compute_ttl(profile)
}
