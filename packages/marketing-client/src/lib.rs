//! Pure email-marketing REST API client.
//!
//! Segments (contact lists) are listed page by page; membership changes go
//! through one bulk call that names every segment it touches.

pub mod error;
pub mod types;

pub use error::{MarketingError, Result};
pub use types::{SegmentAction, SegmentContact, SegmentMembersResponse};

use std::time::Duration;

use reqwest::{Response, StatusCode};
use types::{ContactRef, ListAction, ManageContactsRequest};

#[derive(Debug, Clone)]
pub struct MarketingOptions {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

pub struct MarketingClient {
    client: reqwest::Client,
    options: MarketingOptions,
}

impl MarketingClient {
    pub fn new(options: MarketingOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, options })
    }

    fn url(&self, rest: &str) -> String {
        format!("{}{}", self.options.base_url.trim_end_matches('/'), rest)
    }

    pub async fn list_segment_members(
        &self,
        segment_id: u64,
        offset: usize,
        limit: usize,
    ) -> Result<SegmentMembersResponse> {
        let url = self.url(&format!(
            "/contactslist/{segment_id}/contacts?offset={offset}&limit={limit}"
        ));
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.options.api_key, Some(&self.options.api_secret))
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    /// Apply `action` for every email on every listed segment in one request.
    pub async fn manage_contacts(
        &self,
        emails: &[String],
        segment_ids: &[u64],
        action: SegmentAction,
    ) -> Result<()> {
        let url = self.url("/contacts/managemanycontacts");
        let body = ManageContactsRequest {
            contacts: emails.iter().map(|e| ContactRef { email: e }).collect(),
            contacts_lists: segment_ids
                .iter()
                .map(|&list_id| ListAction { list_id, action })
                .collect(),
        };

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.options.api_key, Some(&self.options.api_secret))
            .json(&body)
            .send()
            .await?;

        check(resp).await?;
        tracing::debug!(
            contacts = emails.len(),
            segments = ?segment_ids,
            action = ?action,
            "Bulk segment update accepted"
        );
        Ok(())
    }
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        return Err(MarketingError::RateLimited { retry_after });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(MarketingError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}
