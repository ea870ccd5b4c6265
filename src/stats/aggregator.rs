// Stats aggregator.
// Combines repository totals with commit history fetched for recently active repositories.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::ActivityWindows;
use crate::github::{CommitTimestamp, RepositorySummary, UpstreamFetcher};

use super::Stats;
use super::activity::{daily_commit_counts, most_active_day, window_start};
use super::languages::RepositoryTotals;

/// Upper bound on concurrent per-repository commit fetches for one user.
pub const MAX_CONCURRENT_COMMIT_FETCHES: usize = 8;

/// Produces [`Stats`] from a repository list and per-repository commit history.
pub struct StatsAggregator {
    fetcher: Arc<dyn UpstreamFetcher>,
    windows: ActivityWindows,
}

impl StatsAggregator {
    pub fn new(fetcher: Arc<dyn UpstreamFetcher>, windows: ActivityWindows) -> Self {
        Self { fetcher, windows }
    }

    pub fn windows(&self) -> &ActivityWindows {
        &self.windows
    }

    /// Aggregate stats for `username` as of `now`.
    ///
    /// Never fails: a repository whose commit history cannot be fetched
    /// contributes nothing to the activity figures.
    pub async fn aggregate(
        &self,
        username: &str,
        repos: &[RepositorySummary],
        now: DateTime<Utc>,
    ) -> Stats {
        let totals = RepositoryTotals::from_repositories(repos);
        let commits = self.collect_commits(username, repos, now).await;
        let commits_30d = daily_commit_counts(&commits, now, self.windows.recent_days)
            .values()
            .sum();

        Stats {
            total_stars: totals.stars,
            total_forks: totals.forks,
            repository_count: totals.repository_count,
            top_languages: totals.top_languages,
            most_active_day: most_active_day(&commits),
            commits_30d,
        }
    }

    /// Fetch commits for repositories updated inside the activity window.
    /// Older repositories are treated as dormant and skipped.
    async fn collect_commits(
        &self,
        username: &str,
        repos: &[RepositorySummary],
        now: DateTime<Utc>,
    ) -> Vec<CommitTimestamp> {
        let since = window_start(now, self.windows.activity_days);
        let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_COMMIT_FETCHES));
        let mut tasks = JoinSet::new();

        for repo in repos.iter().filter(|r| r.updated_at >= since) {
            let fetcher = Arc::clone(&self.fetcher);
            let permits = Arc::clone(&permits);
            let username = username.to_string();
            let repo_name = repo.name.clone();

            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let result = fetcher.fetch_commits(&username, &repo_name, since).await;
                (repo_name, result)
            });
        }

        let mut commits = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((repo, Ok(batch))) => {
                    debug!(username, repo = %repo, count = batch.len(), "fetched commits");
                    commits.extend(batch);
                }
                Ok((repo, Err(e))) => {
                    warn!(username, repo = %repo, error = %e, "skipping commit history");
                }
                Err(e) => {
                    warn!(username, error = %e, "commit fetch task failed");
                }
            }
        }
        commits
    }
}
