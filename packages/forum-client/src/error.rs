use std::time::Duration;

use thiserror::Error;

/// Errors returned by the forum client.
#[derive(Debug, Error)]
pub enum ForumError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("forum API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("forum rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },
}

pub type Result<T> = std::result::Result<T, ForumError>;
