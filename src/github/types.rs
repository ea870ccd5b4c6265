// GitHub API response types and the domain records built from them.
// Wire structs mirror the REST payloads; Profile and RepositorySummary are what the cache sees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author timestamp of a single commit.
pub type CommitTimestamp = DateTime<Utc>;

/// `GET /users/{username}` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUser {
    pub login: String,
    pub name: Option<String>,
    #[serde(default)]
    pub public_repos: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub following: u64,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

/// Entry of `GET /users/{username}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommit {
    pub commit: ApiCommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommitDetail {
    pub author: Option<ApiCommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCommitAuthor {
    pub date: Option<DateTime<Utc>>,
}

impl ApiCommit {
    /// Author date, if GitHub reported one.
    pub fn authored_at(&self) -> Option<CommitTimestamp> {
        self.commit.author.as_ref().and_then(|a| a.date)
    }
}

/// Public profile of a GitHub user, captured at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
    /// When the profile was fetched.
    pub captured_at: DateTime<Utc>,
}

impl Profile {
    /// Build a profile from the API payload, stamped with `captured_at`.
    pub fn from_api(user: ApiUser, captured_at: DateTime<Utc>) -> Self {
        Self {
            login: user.login,
            name: user.name.filter(|n| !n.is_empty()),
            followers: user.followers,
            following: user.following,
            public_repos: user.public_repos,
            bio: user.bio.filter(|b| !b.is_empty()),
            location: user.location.filter(|l| !l.is_empty()),
            created_at: user.created_at,
            html_url: user.html_url,
            captured_at,
        }
    }

    /// Display name, falling back to the login.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

/// Per-repository input to the stats aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySummary {
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    /// Primary language. `None` when GitHub detected none.
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiRepository> for RepositorySummary {
    fn from(repo: ApiRepository) -> Self {
        Self {
            name: repo.name,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo.language.filter(|l| !l.is_empty()),
            updated_at: repo.updated_at,
        }
    }
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
