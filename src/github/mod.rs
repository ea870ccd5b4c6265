// GitHub API module.
// Provides the HTTP client, wire and domain types, and the upstream fetcher trait.

#![allow(dead_code, unused_imports)]

pub mod client;
pub mod endpoints;
pub mod fetcher;
pub mod types;

pub use client::GitHubClient;
pub use fetcher::UpstreamFetcher;
pub use types::{CommitTimestamp, Profile, RateLimit, RepositorySummary};
