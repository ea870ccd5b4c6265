// Upstream fetcher abstraction.
// The cache and aggregator depend on this trait rather than on the HTTP client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

use super::client::GitHubClient;
use super::types::{CommitTimestamp, Profile, RepositorySummary};

/// Source of profiles, repositories and commit history.
#[async_trait]
pub trait UpstreamFetcher: Send + Sync {
    /// Fetch a user's profile.
    async fn fetch_profile(&self, username: &str) -> Result<Profile>;

    /// Fetch all repositories owned by a user, across every page.
    async fn fetch_repositories(&self, username: &str) -> Result<Vec<RepositorySummary>>;

    /// Fetch author timestamps of `username`'s commits to `repo` since `since`.
    async fn fetch_commits(
        &self,
        username: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitTimestamp>>;
}

#[async_trait]
impl UpstreamFetcher for GitHubClient {
    async fn fetch_profile(&self, username: &str) -> Result<Profile> {
        let user = self.get_user(username).await?;
        Ok(Profile::from_api(user, Utc::now()))
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<RepositorySummary>> {
        let repos = self.get_all_user_repos(username).await?;
        Ok(repos.into_iter().map(RepositorySummary::from).collect())
    }

    async fn fetch_commits(
        &self,
        username: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitTimestamp>> {
        let commits = self.get_commits(username, repo, username, since).await?;
        Ok(commits.iter().filter_map(|c| c.authored_at()).collect())
    }
}
