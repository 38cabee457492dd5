//! Server dependencies for reconciliation (using traits for testability)
//!
//! Each REST client crate is wrapped in a small adapter implementing the
//! matching `Base*` trait, and `ServerDeps` holds them behind `Arc<dyn ..>`
//! so tests can swap in the mocks from `test_dependencies`.

use std::sync::Arc;

use access_control_client::{
    AccessControlClient, AccessControlOptions, Credential, User, UserRequest,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use crm_client::{AccountRecord, CrmClient, MembershipRecord, SearchField};
use forum_client::{ForumClient, ForumOptions};
use marketing_client::{MarketingClient, MarketingOptions, SegmentAction};

use crate::common::Page;
use crate::config::{Config, MarketingConfig};
use crate::kernel::{
    BaseAccessControl, BaseForum, BaseMarketingService, BaseMembershipSource, ProviderResult,
};

// =============================================================================
// CRM Adapter (implements BaseMembershipSource trait)
// =============================================================================

pub struct CrmApi(pub Arc<CrmClient>);

#[async_trait]
impl BaseMembershipSource for CrmApi {
    async fn fetch_account(&self, account_id: &str) -> ProviderResult<AccountRecord> {
        Ok(self.0.get_account(account_id).await?)
    }

    async fn fetch_memberships(&self, account_id: &str) -> ProviderResult<Vec<MembershipRecord>> {
        Ok(self.0.get_memberships(account_id).await?)
    }

    async fn search_accounts(
        &self,
        predicates: &[SearchField],
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<AccountRecord>> {
        // The CRM pages by number; offsets from collect_all are always multiples of limit.
        let page = if limit == 0 { 0 } else { offset / limit };
        let response = self
            .0
            .search_accounts(predicates.to_vec(), page, limit)
            .await?;
        Ok(Page::new(
            response.search_results,
            response.pagination.total_results,
        ))
    }

    async fn patch_custom_field(
        &self,
        account_id: &str,
        field: &str,
        value: &str,
    ) -> ProviderResult<()> {
        Ok(self.0.patch_custom_field(account_id, field, value).await?)
    }
}

// =============================================================================
// Access Control Adapter (implements BaseAccessControl trait)
// =============================================================================

pub struct AccessControlApi(pub Arc<AccessControlClient>);

#[async_trait]
impl BaseAccessControl for AccessControlApi {
    async fn list_users(&self, offset: usize, limit: usize) -> ProviderResult<Page<User>> {
        let response = self.0.list_users(offset, limit).await?;
        Ok(Page::new(response.data, response.total_count))
    }

    async fn create_user(&self, request: &UserRequest) -> ProviderResult<User> {
        Ok(self.0.create_user(request).await?)
    }

    async fn update_user(&self, user_id: u64, request: &UserRequest) -> ProviderResult<()> {
        Ok(self.0.update_user(user_id, request).await?)
    }

    async fn get_group_ids(&self, user_id: u64) -> ProviderResult<Vec<u64>> {
        Ok(self.0.get_group_ids(user_id).await?)
    }

    async fn set_group_ids(&self, user_id: u64, group_ids: &[u64]) -> ProviderResult<()> {
        Ok(self.0.set_group_ids(user_id, group_ids).await?)
    }

    async fn list_credentials(&self, user_id: u64) -> ProviderResult<Vec<Credential>> {
        Ok(self.0.list_credentials(user_id).await?)
    }

    async fn create_mobile_credential(
        &self,
        user_id: u64,
        credential_type_id: u64,
        name: &str,
    ) -> ProviderResult<Credential> {
        Ok(self
            .0
            .create_mobile_credential(user_id, credential_type_id, name)
            .await?)
    }

    async fn activate_mobile_credential(
        &self,
        user_id: u64,
        credential_id: u64,
    ) -> ProviderResult<()> {
        Ok(self
            .0
            .activate_mobile_credential(user_id, credential_id)
            .await?)
    }

    async fn delete_credential(&self, user_id: u64, credential_id: u64) -> ProviderResult<()> {
        Ok(self.0.delete_credential(user_id, credential_id).await?)
    }
}

// =============================================================================
// Forum Adapter (implements BaseForum trait)
// =============================================================================

pub struct ForumApi(pub Arc<ForumClient>);

#[async_trait]
impl BaseForum for ForumApi {
    async fn list_group_members(
        &self,
        group_name: &str,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<String>> {
        let response = self.0.list_group_members(group_name, offset, limit).await?;
        Ok(Page::new(
            response.members.into_iter().map(|m| m.username).collect(),
            Some(response.meta.total),
        ))
    }

    async fn add_members(&self, group_id: u64, usernames: &[String]) -> ProviderResult<()> {
        Ok(self.0.add_members(group_id, usernames).await?)
    }

    async fn remove_members(&self, group_id: u64, usernames: &[String]) -> ProviderResult<()> {
        Ok(self.0.remove_members(group_id, usernames).await?)
    }
}

// =============================================================================
// Marketing Adapter (implements BaseMarketingService trait)
// =============================================================================

pub struct MarketingApi(pub Arc<MarketingClient>);

#[async_trait]
impl BaseMarketingService for MarketingApi {
    async fn list_segment_members(
        &self,
        segment_id: u64,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<String>> {
        let response = self
            .0
            .list_segment_members(segment_id, offset, limit)
            .await?;
        Ok(Page::new(
            response.data.into_iter().map(|c| c.email).collect(),
            Some(response.total),
        ))
    }

    async fn add_to_segments(&self, emails: &[String], segment_ids: &[u64]) -> ProviderResult<()> {
        Ok(self
            .0
            .manage_contacts(emails, segment_ids, SegmentAction::Add)
            .await?)
    }

    async fn remove_from_segments(
        &self,
        emails: &[String],
        segment_ids: &[u64],
    ) -> ProviderResult<()> {
        Ok(self
            .0
            .manage_contacts(emails, segment_ids, SegmentAction::Remove)
            .await?)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Provider handles shared by the orchestrator and the webhook handler.
#[derive(Clone)]
pub struct ServerDeps {
    pub crm: Arc<dyn BaseMembershipSource>,
    pub access_control: Arc<dyn BaseAccessControl>,
    /// Absent when no forum is configured.
    pub forum: Option<Arc<dyn BaseForum>>,
    pub primary_marketing: Option<Arc<dyn BaseMarketingService>>,
    pub secondary_marketing: Option<Arc<dyn BaseMarketingService>>,
}

impl ServerDeps {
    pub fn new(
        crm: Arc<dyn BaseMembershipSource>,
        access_control: Arc<dyn BaseAccessControl>,
        forum: Option<Arc<dyn BaseForum>>,
        primary_marketing: Option<Arc<dyn BaseMarketingService>>,
        secondary_marketing: Option<Arc<dyn BaseMarketingService>>,
    ) -> Self {
        Self {
            crm,
            access_control,
            forum,
            primary_marketing,
            secondary_marketing,
        }
    }

    /// Build real HTTP clients from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let crm = CrmClient::new(
            config.crm.base_url.clone(),
            config.crm.org_id.clone(),
            config.crm.api_key.clone(),
        )
        .context("Failed to build CRM client")?;

        let access_control = AccessControlClient::new(AccessControlOptions {
            base_url: config.access_control.base_url.clone(),
            org_id: config.access_control.org_id,
            username: config.access_control.username.clone(),
            password: config.access_control.password.clone(),
        })
        .context("Failed to build access-control client")?;

        let forum = match &config.forum {
            Some(forum) => {
                let client = ForumClient::new(ForumOptions {
                    base_url: forum.base_url.clone(),
                    api_key: forum.api_key.clone(),
                    api_username: forum.api_username.clone(),
                })
                .context("Failed to build forum client")?;
                Some(Arc::new(ForumApi(Arc::new(client))) as Arc<dyn BaseForum>)
            }
            None => None,
        };

        Ok(Self::new(
            Arc::new(CrmApi(Arc::new(crm))),
            Arc::new(AccessControlApi(Arc::new(access_control))),
            forum,
            marketing_from_config(config.primary_marketing.as_ref())?,
            marketing_from_config(config.secondary_marketing.as_ref())?,
        ))
    }
}

fn marketing_from_config(
    config: Option<&MarketingConfig>,
) -> Result<Option<Arc<dyn BaseMarketingService>>> {
    let Some(config) = config else {
        return Ok(None);
    };
    let client = MarketingClient::new(MarketingOptions {
        base_url: config.base_url.clone(),
        api_key: config.api_key.clone(),
        api_secret: config.api_secret.clone(),
    })
    .with_context(|| format!("Failed to build {} marketing client", config.settings.name))?;
    let api: Arc<dyn BaseMarketingService> = Arc::new(MarketingApi(Arc::new(client)));
    Ok(Some(api))
}
