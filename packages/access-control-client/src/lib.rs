//! Pure access-control platform REST API client.
//!
//! Users, their access-group ids, and their credentials (mobile or card).
//! Mobile credentials are issued in two steps: create, then activate.

pub mod error;
pub mod types;

pub use error::{AccessControlError, Result};
pub use types::{
    ApiResponse, Credential, CredentialType, GroupRef, Identity, MobileCredential, User,
    UserRequest,
};

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use types::{CreateCredentialRequest, GroupIdsRequest, NewMobile};

#[derive(Debug, Clone)]
pub struct AccessControlOptions {
    pub base_url: String,
    pub org_id: u64,
    pub username: String,
    pub password: String,
}

pub struct AccessControlClient {
    client: reqwest::Client,
    options: AccessControlOptions,
}

impl AccessControlClient {
    pub fn new(options: AccessControlOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, options })
    }

    fn org_url(&self, rest: &str) -> String {
        format!(
            "{}/orgs/{}{}",
            self.options.base_url.trim_end_matches('/'),
            self.options.org_id,
            rest
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>> {
        let resp = self
            .client
            .get(url)
            .basic_auth(&self.options.username, Some(&self.options.password))
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    /// One page of users, including their groups.
    pub async fn list_users(&self, offset: usize, limit: usize) -> Result<ApiResponse<Vec<User>>> {
        let url = self.org_url(&format!("/users?offset={offset}&limit={limit}"));
        self.get_json(&url).await
    }

    /// Create a user. The platform answers with the existing record when the
    /// email is already known, so callers must inspect `created_at`.
    pub async fn create_user(&self, request: &UserRequest) -> Result<User> {
        let url = self.org_url("/users");
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.options.username, Some(&self.options.password))
            .json(request)
            .send()
            .await?;

        let body: ApiResponse<User> = check(resp).await?.json().await?;
        Ok(body.data)
    }

    pub async fn update_user(&self, user_id: u64, request: &UserRequest) -> Result<()> {
        let url = self.org_url(&format!("/users/{user_id}"));
        let resp = self
            .client
            .patch(&url)
            .basic_auth(&self.options.username, Some(&self.options.password))
            .json(request)
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn get_group_ids(&self, user_id: u64) -> Result<Vec<u64>> {
        let url = self.org_url(&format!("/users/{user_id}/groups"));
        let body: ApiResponse<Vec<GroupRef>> = self.get_json(&url).await?;
        Ok(body.data.into_iter().map(|g| g.id).collect())
    }

    /// Replace the user's group ids. An empty slice removes every group.
    pub async fn set_group_ids(&self, user_id: u64, group_ids: &[u64]) -> Result<()> {
        let url = self.org_url(&format!("/users/{user_id}/groupIds"));
        let resp = self
            .client
            .put(&url)
            .basic_auth(&self.options.username, Some(&self.options.password))
            .json(&GroupIdsRequest { group_ids })
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn list_credentials(&self, user_id: u64) -> Result<Vec<Credential>> {
        let url = self.org_url(&format!("/users/{user_id}/credentials"));
        let body: ApiResponse<Vec<Credential>> = self.get_json(&url).await?;
        Ok(body.data)
    }

    pub async fn create_mobile_credential(
        &self,
        user_id: u64,
        credential_type_id: u64,
        name: &str,
    ) -> Result<Credential> {
        let url = self.org_url(&format!("/users/{user_id}/credentials"));
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.options.username, Some(&self.options.password))
            .json(&CreateCredentialRequest {
                credential_type_id,
                mobile: NewMobile { name },
            })
            .send()
            .await?;

        let body: ApiResponse<Credential> = check(resp).await?.json().await?;
        Ok(body.data)
    }

    /// Second step of mobile issuance; sends the setup invitation.
    pub async fn activate_mobile_credential(&self, user_id: u64, credential_id: u64) -> Result<()> {
        let url = self.org_url(&format!(
            "/users/{user_id}/credentials/{credential_id}/setupMobile"
        ));
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.options.username, Some(&self.options.password))
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn delete_credential(&self, user_id: u64, credential_id: u64) -> Result<()> {
        let url = self.org_url(&format!("/users/{user_id}/credentials/{credential_id}"));
        let resp = self
            .client
            .delete(&url)
            .basic_auth(&self.options.username, Some(&self.options.password))
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
        return Err(AccessControlError::RateLimited { retry_after });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %message, "Access-control request failed");
        return Err(AccessControlError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}
