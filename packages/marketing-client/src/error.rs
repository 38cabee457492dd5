use std::time::Duration;

use thiserror::Error;

/// Errors returned by the marketing client.
#[derive(Debug, Error)]
pub enum MarketingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("marketing API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("marketing rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },
}

pub type Result<T> = std::result::Result<T, MarketingError>;
