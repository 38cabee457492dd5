use std::time::Duration;

use thiserror::Error;

/// Errors returned by the CRM client.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CRM API error {status}: {message}")]
    Api { status: u16, message: String },

    /// HTTP 429. `retry_after` comes from the `Retry-After` header when present.
    #[error("CRM rate limit exceeded")]
    RateLimited { retry_after: Option<Duration> },
}

pub type Result<T> = std::result::Result<T, CrmError>;
