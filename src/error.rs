// Error types for git-receipt.
// Covers upstream API failures, timeouts, configuration and serialization errors.

#![allow(dead_code)]

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("GitHub API unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl ReceiptError {
    /// Map a transport error, keeping timeouts distinguishable for logs.
    pub fn from_transport(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_timeout() {
            ReceiptError::Timeout(endpoint.to_string())
        } else {
            ReceiptError::Unavailable(err)
        }
    }

    /// Whether the upstream reported the requested resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReceiptError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, ReceiptError>;
