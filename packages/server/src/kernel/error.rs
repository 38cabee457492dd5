//! Error kinds shared by every provider integration.
//!
//! Each kind carries its own policy: only `RateLimited` is retried (see
//! `kernel::retry`), everything else is logged and abandoned by the caller.

use std::time::Duration;

use access_control_client::AccessControlError;
use crm_client::CrmError;
use forum_client::ForumError;
use marketing_client::MarketingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure (connect, timeout, TLS).
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// Non-success HTTP status other than 429.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request was rejected before it was sent.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ProviderError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }

    fn from_transport(is_decode: bool, message: String) -> Self {
        if is_decode {
            ProviderError::Decode(message)
        } else {
            ProviderError::Network(message)
        }
    }
}

impl From<CrmError> for ProviderError {
    fn from(err: CrmError) -> Self {
        match err {
            CrmError::Http(e) => Self::from_transport(e.is_decode(), e.to_string()),
            CrmError::Api { status, message } => Self::Api {
                status,
                body: message,
            },
            CrmError::RateLimited { retry_after } => Self::RateLimited { retry_after },
        }
    }
}

impl From<AccessControlError> for ProviderError {
    fn from(err: AccessControlError) -> Self {
        match err {
            AccessControlError::Http(e) => Self::from_transport(e.is_decode(), e.to_string()),
            AccessControlError::Api { status, message } => Self::Api {
                status,
                body: message,
            },
            AccessControlError::RateLimited { retry_after } => Self::RateLimited { retry_after },
        }
    }
}

impl From<ForumError> for ProviderError {
    fn from(err: ForumError) -> Self {
        match err {
            ForumError::Http(e) => Self::from_transport(e.is_decode(), e.to_string()),
            ForumError::Api { status, message } => Self::Api {
                status,
                body: message,
            },
            ForumError::RateLimited { retry_after } => Self::RateLimited { retry_after },
        }
    }
}

impl From<MarketingError> for ProviderError {
    fn from(err: MarketingError) -> Self {
        match err {
            MarketingError::Http(e) => Self::from_transport(e.is_decode(), e.to_string()),
            MarketingError::Api { status, message } => Self::Api {
                status,
                body: message,
            },
            MarketingError::RateLimited { retry_after } => Self::RateLimited { retry_after },
        }
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
