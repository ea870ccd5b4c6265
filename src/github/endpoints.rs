// GitHub API endpoint functions.
// Typed calls for user profiles, repository listings, commit history and API status.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::error::{ReceiptError, Result};

use super::client::GitHubClient;
use super::types::{ApiCommit, ApiRepository, ApiUser};

/// Page size for repository listings (GitHub maximum).
pub const REPOS_PER_PAGE: u32 = 100;

/// Account probed by the status check.
const STATUS_PROBE_USER: &str = "github";

impl GitHubClient {
    /// Get a user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<ApiUser> {
        let response = self
            .get(&format!("/users/{}", username), self.timeouts().profile)
            .await?;
        let user: ApiUser = response.json().await?;
        Ok(user)
    }

    /// Get one page of a user's repositories, most recently updated first.
    pub async fn get_user_repos(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ApiRepository>> {
        let params = [
            ("sort", "updated"),
            ("direction", "desc"),
            ("page", &page.to_string()),
            ("per_page", &per_page.to_string()),
        ];
        let response = self
            .get_with_params(
                &format!("/users/{}/repos", username),
                &params,
                self.timeouts().repositories,
            )
            .await?;
        let repos: Vec<ApiRepository> = response.json().await?;
        Ok(repos)
    }

    /// Get every repository of a user, following pages until a short one.
    ///
    /// The whole enumeration shares the repositories timeout.
    pub async fn get_all_user_repos(&self, username: &str) -> Result<Vec<ApiRepository>> {
        let enumerate = async {
            let mut all = Vec::new();
            let mut page = 1;
            loop {
                let repos = self.get_user_repos(username, page, REPOS_PER_PAGE).await?;
                let count = repos.len();
                all.extend(repos);
                if count < REPOS_PER_PAGE as usize {
                    break;
                }
                page += 1;
            }
            debug!(username, pages = page, repos = all.len(), "listed repositories");
            Ok::<_, ReceiptError>(all)
        };

        tokio::time::timeout(self.timeouts().repositories, enumerate)
            .await
            .map_err(|_| ReceiptError::Timeout(format!("/users/{}/repos", username)))?
    }

    /// Get commits authored by `author` in `owner/repo` since `since` (single page).
    pub async fn get_commits(
        &self,
        owner: &str,
        repo: &str,
        author: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ApiCommit>> {
        let params = [
            ("author", author.to_string()),
            ("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("per_page", self.commits_per_page().to_string()),
        ];
        let response = self
            .get_with_params(
                &format!("/repos/{}/{}/commits", owner, repo),
                &params,
                self.timeouts().commits,
            )
            .await?;
        let commits: Vec<ApiCommit> = response.json().await?;
        Ok(commits)
    }

    /// Check that the API answers a known lookup within the status timeout.
    pub async fn check_api_status(&self) -> Result<bool> {
        self.get(
            &format!("/users/{}", STATUS_PROBE_USER),
            self.timeouts().status,
        )
        .await?;
        Ok(true)
    }
}
