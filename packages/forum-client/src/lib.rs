//! Pure discussion-forum REST API client.
//!
//! Only the group-membership surface: list a group's members page by page and
//! add or remove members by username.

pub mod error;
pub mod types;

pub use error::{ForumError, Result};
pub use types::{GroupMember, GroupMembersResponse, MembersMeta};

use std::time::Duration;

use reqwest::{Response, StatusCode};
use types::UsernamesRequest;

#[derive(Debug, Clone)]
pub struct ForumOptions {
    pub base_url: String,
    pub api_key: String,
    pub api_username: String,
}

pub struct ForumClient {
    client: reqwest::Client,
    options: ForumOptions,
}

impl ForumClient {
    pub fn new(options: ForumOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, options })
    }

    fn url(&self, rest: &str) -> String {
        format!("{}{}", self.options.base_url.trim_end_matches('/'), rest)
    }

    /// One page of a group's members. Groups are addressed by name here.
    pub async fn list_group_members(
        &self,
        group_name: &str,
        offset: usize,
        limit: usize,
    ) -> Result<GroupMembersResponse> {
        let url = self.url(&format!(
            "/groups/{group_name}/members.json?offset={offset}&limit={limit}"
        ));
        let resp = self
            .client
            .get(&url)
            .header("Api-Key", &self.options.api_key)
            .header("Api-Username", &self.options.api_username)
            .send()
            .await?;

        Ok(check(resp).await?.json().await?)
    }

    /// Add usernames to a group. Groups are addressed by numeric id here.
    pub async fn add_members(&self, group_id: u64, usernames: &[String]) -> Result<()> {
        let url = self.url(&format!("/groups/{group_id}/members.json"));
        let resp = self
            .client
            .put(&url)
            .header("Api-Key", &self.options.api_key)
            .header("Api-Username", &self.options.api_username)
            .json(&UsernamesRequest {
                usernames: usernames.join(","),
            })
            .send()
            .await?;

        check(resp).await?;
        Ok(())
    }

    pub async fn remove_members(&self, group_id: u64, usernames: &[String]) -> Result<()> {
        let url = self.url(&format!("/groups/{group_id}/members.json"));
        let resp = self
            .client
            .delete(&url)
            .header("Api-Key", &self.options.api_key)
            .header("Api-Username", &self.options.api_username)
            .json(&UsernamesRequest {
                usernames: usernames.join(","),
            })
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
        return Err(ForumError::RateLimited { retry_after });
    }
    if !status.is_success() {
        let message = resp.text().await.unwrap_or_default();
        return Err(ForumError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(resp)
}
