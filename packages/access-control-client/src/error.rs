use std::time::Duration;

use thiserror::Error;

/// Errors returned by the access-control client.
#[derive(Debug, Error)]
pub enum AccessControlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("access-control API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("access-control rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },
}

pub type Result<T> = std::result::Result<T, AccessControlError>;
