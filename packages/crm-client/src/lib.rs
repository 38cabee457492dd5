//! Pure membership CRM REST API client.
//!
//! Covers the four calls the reconciliation engine needs: fetch an account,
//! fetch its membership history, search accounts by field predicates, and patch
//! a custom field.
//!
//! # Example
//!
//! ```rust,ignore
//! use crm_client::{CrmClient, SearchField};
//!
//! let client = CrmClient::new("https://crm.example.org/v2", "org-id", "api-key")?;
//! let page = client
//!     .search_accounts(vec![SearchField::not_blank("AccessControlUserId")], 0, 100)
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{CrmError, Result};
pub use types::{
    AccountRecord, CustomField, MembershipLevel, MembershipRecord, SearchField, SearchOperator,
    SearchPagination, SearchRequest, SearchResponse,
};

use std::time::Duration;

use reqwest::{Response, StatusCode};
use types::{MembershipsResponse, PatchAccountRequest, PatchField};

pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    org_id: String,
    api_key: String,
}

impl CrmClient {
    pub fn new(
        base_url: impl Into<String>,
        org_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            org_id: org_id.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch a single account with its custom fields.
    pub async fn get_account(&self, account_id: &str) -> Result<AccountRecord> {
        let url = format!("{}/accounts/{}", self.base_url, account_id);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.org_id, Some(&self.api_key))
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    /// Fetch the full membership history of an account.
    pub async fn get_memberships(&self, account_id: &str) -> Result<Vec<MembershipRecord>> {
        let url = format!("{}/accounts/{}/memberships", self.base_url, account_id);
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.org_id, Some(&self.api_key))
            .send()
            .await?;

        let body: MembershipsResponse = check(resp).await?.json().await?;
        Ok(body.memberships)
    }

    /// Search accounts matching every predicate. Pages are zero-based.
    pub async fn search_accounts(
        &self,
        search_fields: Vec<SearchField>,
        page: usize,
        page_size: usize,
    ) -> Result<SearchResponse> {
        let url = format!("{}/accounts/search", self.base_url);
        let request = SearchRequest {
            search_fields,
            pagination: SearchPagination {
                current_page: page,
                page_size,
                total_results: None,
            },
        };

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.org_id, Some(&self.api_key))
            .json(&request)
            .send()
            .await?;

        let body: SearchResponse = check(resp).await?.json().await?;
        tracing::debug!(
            page,
            results = body.search_results.len(),
            total = ?body.pagination.total_results,
            "CRM search page fetched"
        );
        Ok(body)
    }

    /// Overwrite one custom field on an account.
    pub async fn patch_custom_field(
        &self,
        account_id: &str,
        field_name: &str,
        value: &str,
    ) -> Result<()> {
        let url = format!("{}/accounts/{}", self.base_url, account_id);
        let body = PatchAccountRequest {
            custom_fields: [PatchField {
                name: field_name,
                value,
            }],
        };

        let resp = self
            .client
            .patch(&url)
            .basic_auth(&self.org_id, Some(&self.api_key))
            .json(&body)
            .send()
            .await?;

        check(resp).await?;
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
        return Err(CrmError::RateLimited { retry_after });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(CrmError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}
