// GitHub API HTTP client.
// Handles optional authentication, rate limit tracking, per-call timeouts and status mapping.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::config::{Config, Timeouts};
use crate::error::{ReceiptError, Result};

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client shared by all request tasks.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    timeouts: Timeouts,
    commits_per_page: u32,
    with_auth: bool,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client. Without a token, requests are unauthenticated.
    pub fn new(token: Option<&str>, base_url: &str, timeouts: Timeouts) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| ReceiptError::Config(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("git-receipt"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ReceiptError::Unavailable)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts,
            commits_per_page: 100,
            with_auth: token.is_some(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::new(
            config.github_token.as_deref(),
            &config.api_base_url,
            config.timeouts.clone(),
        )?;
        client.commits_per_page = config.activity.commits_per_repo;
        Ok(client)
    }

    /// Whether requests carry a token.
    pub fn with_auth(&self) -> bool {
        self.with_auth
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn commits_per_page(&self) -> u32 {
        self.commits_per_page
    }

    /// Snapshot of the most recently observed rate limit.
    pub fn rate_limit(&self) -> RateLimit {
        self.lock_rate_limit().clone()
    }

    /// Make a GET request bounded by `timeout`.
    pub async fn get(&self, endpoint: &str, timeout: Duration) -> Result<Response> {
        self.get_with_params(endpoint, &[] as &[(&str, &str)], timeout)
            .await
    }

    /// Make a GET request with query parameters, bounded by `timeout`.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
        timeout: Duration,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, ?timeout, "GitHub request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ReceiptError::from_transport(e, endpoint))?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    fn lock_rate_limit(&self) -> MutexGuard<'_, RateLimit> {
        self.rate_limit
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let mut rate_limit = self.lock_rate_limit();
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(ReceiptError::Unauthorized),
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(ReceiptError::NotFound(url))
            }
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                let rate_limit = self.rate_limit();
                if rate_limit.remaining == 0 {
                    let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                        .map(|dt| dt.format("%H:%M:%S").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    Err(ReceiptError::RateLimited { reset_at })
                } else {
                    Err(ReceiptError::Other(format!(
                        "Forbidden: {}",
                        response.text().await.unwrap_or_default()
                    )))
                }
            }
            status => Err(ReceiptError::Other(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            ))),
        }
    }
}
