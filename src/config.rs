// Configuration for git-receipt.
// Layers defaults, an optional JSON config file and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::cache::TtlPolicy;
use crate::error::{ReceiptError, Result};

/// Default GitHub REST API root.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default cost budget for the cache store.
pub const DEFAULT_MAX_COST: u64 = 1_000_000;

/// Longest accepted activity window, in days.
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// Environment variable holding the GitHub token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Token used for authenticated requests. Unauthenticated when absent.
    pub github_token: Option<String>,
    pub api_base_url: String,
    pub cache: CacheConfig,
    pub ttl: TtlPolicy,
    pub timeouts: Timeouts,
    pub activity: ActivityWindows,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: DEFAULT_API_BASE.to_string(),
            cache: CacheConfig::default(),
            ttl: TtlPolicy::default(),
            timeouts: Timeouts::default(),
            activity: ActivityWindows::default(),
        }
    }
}

/// Cache store sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total cost the store admits before evicting.
    pub max_cost: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cost: DEFAULT_MAX_COST,
        }
    }
}

/// Per-call upstream timeouts. Cheaper calls get tighter bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "duration_secs")]
    pub status: Duration,
    #[serde(with = "duration_secs")]
    pub profile: Duration,
    #[serde(with = "duration_secs")]
    pub repositories: Duration,
    #[serde(with = "duration_secs")]
    pub commits: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            status: Duration::from_secs(5),
            profile: Duration::from_secs(10),
            repositories: Duration::from_secs(20),
            commits: Duration::from_secs(25),
        }
    }
}

/// Trailing windows used by the stats aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityWindows {
    /// Repositories updated within this many days get their commits scanned.
    pub activity_days: i64,
    /// Window for the recent commit count.
    pub recent_days: i64,
    /// Commits requested per repository (a single page).
    pub commits_per_repo: u32,
}

impl Default for ActivityWindows {
    fn default() -> Self {
        Self {
            activity_days: 90,
            recent_days: 30,
            commits_per_repo: 100,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `config.json` in the
    /// platform config directory is read if present. `GITHUB_TOKEN` wins
    /// over any token from the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_token(std::env::var(TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| ReceiptError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Override the token with a non-empty environment value.
    pub fn apply_env_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.github_token = Some(token);
        }
    }

    /// Reject values that would make the cache or aggregator meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_cost == 0 {
            return Err(ReceiptError::Config("cache.max_cost must be > 0".into()));
        }
        if self.activity.recent_days <= 0 || self.activity.activity_days <= 0 {
            return Err(ReceiptError::Config(
                "activity windows must be positive".into(),
            ));
        }
        if self.activity.activity_days > MAX_WINDOW_DAYS {
            return Err(ReceiptError::Config(format!(
                "activity windows cannot exceed {} days",
                MAX_WINDOW_DAYS
            )));
        }
        if self.activity.recent_days > self.activity.activity_days {
            return Err(ReceiptError::Config(
                "activity.recent_days cannot exceed activity.activity_days".into(),
            ));
        }
        Ok(())
    }
}

/// Path to the default config file (~/.config/git-receipt/config.json on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "git-receipt").map(|dirs| dirs.config_dir().join("config.json"))
}

/// Serde adapter storing a `Duration` as whole seconds.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE);
        assert_eq!(config.cache.max_cost, 1_000_000);
        assert_eq!(config.timeouts.status, Duration::from_secs(5));
        assert_eq!(config.timeouts.commits, Duration::from_secs(25));
        assert_eq!(config.activity.activity_days, 90);
        assert_eq!(config.activity.recent_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(br#"{"cache": {"max_cost": 500}, "ttl": {"default_ttl": 60}}"#)
            .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.cache.max_cost, 500);
        assert_eq!(config.ttl.default_ttl, Duration::from_secs(60));
        assert_eq!(config.ttl.popular_followers, 1000);
        assert_eq!(config.timeouts.profile, Duration::from_secs(10));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ReceiptError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.json");
        assert!(matches!(
            Config::load(Some(path.as_path())),
            Err(ReceiptError::Io(_))
        ));
    }

    #[test]
    fn test_env_token_overrides() {
        let mut config = Config {
            github_token: Some("from-file".to_string()),
            ..Config::default()
        };

        config.apply_env_token(Some("   ".to_string()));
        assert_eq!(config.github_token.as_deref(), Some("from-file"));

        config.apply_env_token(Some("from-env".to_string()));
        assert_eq!(config.github_token.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_validate_rejects_inverted_windows() {
        let mut config = Config::default();
        config.activity.recent_days = 120;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cache.max_cost = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_windows() {
        let mut config = Config::default();
        config.activity.activity_days = 1_000_000_000_000;
        assert!(matches!(config.validate(), Err(ReceiptError::Config(_))));

        let mut config = Config::default();
        config.activity.activity_days = MAX_WINDOW_DAYS;
        config.activity.recent_days = MAX_WINDOW_DAYS;
        assert!(config.validate().is_ok());

        config.activity.recent_days = MAX_WINDOW_DAYS + 1;
        assert!(config.validate().is_err());
    }
}
