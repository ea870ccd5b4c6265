// git-receipt entry point.
// Wires configuration, the GitHub client and the cache, then runs one CLI command.

mod cache;
mod config;
mod error;
mod github;
mod stats;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cache::{CacheEntry, CacheManager};
use crate::config::Config;
use crate::github::GitHubClient;

#[derive(Parser, Debug)]
#[command(
    name = "git-receipt",
    about = "GitHub profile stats through an adaptive cache"
)]
struct Cli {
    /// Path to a JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve usernames through the cache and print their records as JSON.
    Fetch {
        #[arg(required = true)]
        usernames: Vec<String>,

        /// Resolve every username this many times (later rounds hit the cache).
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },
    /// Check that the GitHub API answers.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let client =
        Arc::new(GitHubClient::from_config(&config).context("failed to build GitHub client")?);
    info!(
        api = %config.api_base_url,
        authenticated = client.with_auth(),
        "GitHub client ready"
    );

    match cli.command {
        Command::Fetch { usernames, repeat } => fetch(client, &config, usernames, repeat).await,
        Command::Ping => ping(&client).await,
    }
}

/// Resolve each username on its own task, `repeat` rounds, then print metrics.
async fn fetch(
    client: Arc<GitHubClient>,
    config: &Config,
    usernames: Vec<String>,
    repeat: u32,
) -> anyhow::Result<()> {
    let usernames: Vec<String> = usernames
        .into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();
    if usernames.is_empty() {
        bail!("at least one non-empty username is required");
    }

    let cache = Arc::new(CacheManager::new(client, config));

    for round in 1..=repeat.max(1) {
        let mut tasks = JoinSet::new();
        for username in &usernames {
            let cache = Arc::clone(&cache);
            let username = username.clone();
            tasks.spawn(async move {
                let result = cache.get_user_data(&username).await;
                (username, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (username, result) = joined.context("request task panicked")?;
            let record = match result {
                Ok(entry) => entry_record(&username, round, &entry),
                Err(e) => {
                    warn!(username = %username, error = %e, "lookup failed");
                    json!({ "username": username, "round": round, "error": e.to_string() })
                }
            };
            println!("{}", record);
        }
    }

    let metrics = cache.get_cache_metrics();
    println!(
        "{}",
        json!({ "metrics": metrics, "entries": cache.entry_count() })
    );
    Ok(())
}

fn entry_record(username: &str, round: u32, entry: &CacheEntry) -> serde_json::Value {
    json!({
        "username": username,
        "round": round,
        "entry": entry,
        "top_languages": entry.stats.top_languages_label(),
        "display_name": entry.profile.display_name(),
        "expires_at": entry.expires_at(),
        "cost": entry.cost(),
        "contribution_score": entry.contribution_score(),
    })
}

async fn ping(client: &GitHubClient) -> anyhow::Result<()> {
    let github_api = match client.check_api_status().await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "GitHub API check failed");
            "error"
        }
    };
    let rate_limit = client.rate_limit();

    println!(
        "{}",
        json!({
            "status": "ok",
            "timestamp": Utc::now().timestamp(),
            "github_api": github_api,
            "authenticated": client.with_auth(),
            "rate_limit": { "limit": rate_limit.limit, "remaining": rate_limit.remaining, "reset": rate_limit.reset },
        })
    );
    Ok(())
}
