// Test doubles for the upstream fetcher.
// An in-memory fetcher with call counters, injectable failures and latency,
// plus a loopback HTTP server for exercising the real client.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{ReceiptError, Result};
use crate::github::{CommitTimestamp, Profile, RepositorySummary, UpstreamFetcher};

/// Build a profile with the popularity signals the TTL policy reads.
pub fn profile(login: &str, followers: u64, public_repos: u64) -> Profile {
    Profile {
        login: login.to_string(),
        name: Some(format!("{} display", login)),
        followers,
        following: 1,
        public_repos,
        bio: None,
        location: None,
        created_at: Utc::now() - chrono::Duration::days(1000),
        html_url: format!("https://github.com/{}", login),
        captured_at: Utc::now(),
    }
}

/// Build a repository last updated `updated_days_ago` days ago.
pub fn repo(
    name: &str,
    language: Option<&str>,
    stars: u64,
    forks: u64,
    updated_days_ago: i64,
) -> RepositorySummary {
    RepositorySummary {
        name: name.to_string(),
        stars,
        forks,
        language: language.map(str::to_string),
        updated_at: Utc::now() - chrono::Duration::days(updated_days_ago),
    }
}

#[derive(Default)]
pub struct FakeFetcher {
    profiles: HashMap<String, Profile>,
    repositories: HashMap<String, Vec<RepositorySummary>>,
    commits: HashMap<String, Vec<CommitTimestamp>>,
    failing_commits: HashSet<String>,
    failing_repositories: HashSet<String>,
    latency: Duration,
    profile_calls: AtomicUsize,
    repository_calls: AtomicUsize,
    commit_calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, profile: Profile, repos: Vec<RepositorySummary>) -> Self {
        self.repositories.insert(profile.login.clone(), repos);
        self.profiles.insert(profile.login.clone(), profile);
        self
    }

    pub fn with_commits(mut self, repo: &str, commits: Vec<CommitTimestamp>) -> Self {
        self.commits.insert(repo.to_string(), commits);
        self
    }

    pub fn with_failing_commits(mut self, repo: &str) -> Self {
        self.failing_commits.insert(repo.to_string());
        self
    }

    pub fn with_failing_repositories(mut self, username: &str) -> Self {
        self.failing_repositories.insert(username.to_string());
        self
    }

    /// Delay applied to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn repository_calls(&self) -> usize {
        self.repository_calls.load(Ordering::SeqCst)
    }

    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }

    async fn delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl UpstreamFetcher for FakeFetcher {
    async fn fetch_profile(&self, username: &str) -> Result<Profile> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        self.profiles
            .get(username)
            .map(|p| Profile {
                captured_at: Utc::now(),
                ..p.clone()
            })
            .ok_or_else(|| ReceiptError::NotFound(format!("/users/{}", username)))
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<RepositorySummary>> {
        self.repository_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.failing_repositories.contains(username) {
            return Err(ReceiptError::Timeout(format!("/users/{}/repos", username)));
        }
        self.repositories
            .get(username)
            .cloned()
            .ok_or_else(|| ReceiptError::NotFound(format!("/users/{}/repos", username)))
    }

    async fn fetch_commits(
        &self,
        _username: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<CommitTimestamp>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.failing_commits.contains(repo) {
            return Err(ReceiptError::Other(format!("HTTP 409 Conflict: {}", repo)));
        }
        Ok(self
            .commits
            .get(repo)
            .map(|commits| commits.iter().copied().filter(|c| *c >= since).collect())
            .unwrap_or_default())
    }
}

/// Canned reply from [`StubServer`].
pub struct StubResponse {
    pub status: u16,
    pub delay: Duration,
    pub body: String,
}

impl StubResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            delay: Duration::ZERO,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            delay: Duration::ZERO,
            body: "{}".to_string(),
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Minimal HTTP/1.1 server on 127.0.0.1 answering every request via a handler.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Start serving. The handler receives the request target (path and query).
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str) -> StubResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(handler);

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let handler = Arc::clone(&handler);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&head);
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().unwrap().push(target.clone());

                    let reply = handler(&target);
                    tokio::time::sleep(reply.delay).await;
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        reply.status,
                        reply.body.len(),
                        reply.body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { base_url, requests }
    }

    /// Request targets received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Decoded value of query parameter `key` in a request target.
pub fn query_param(target: &str, key: &str) -> Option<String> {
    let query = target.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.replace("%3A", ":").replace("%2B", "+"))
    })
}

/// JSON array of `count` repositories named `repo-{first}`, `repo-{first+1}`, ...
pub fn repos_json(first: usize, count: usize) -> String {
    let repos: Vec<String> = (first..first + count)
        .map(|i| {
            format!(
                r#"{{"name":"repo-{}","stargazers_count":1,"forks_count":0,"language":"Rust","updated_at":"2024-05-01T00:00:00Z"}}"#,
                i
            )
        })
        .collect();
    format!("[{}]", repos.join(","))
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}
