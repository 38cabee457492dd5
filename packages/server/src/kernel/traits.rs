// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Reconciliation rules live in the domains and talk to providers through these.
//
// Naming convention: Base* for trait names (e.g., BaseMembershipSource, BaseForum)

use access_control_client::{Credential, User, UserRequest};
use async_trait::async_trait;
use crm_client::{AccountRecord, MembershipRecord, SearchField};

use super::ProviderResult;
use crate::common::Page;

// =============================================================================
// Membership Source Trait (CRM)
// =============================================================================

#[async_trait]
pub trait BaseMembershipSource: Send + Sync {
    async fn fetch_account(&self, account_id: &str) -> ProviderResult<AccountRecord>;

    async fn fetch_memberships(&self, account_id: &str) -> ProviderResult<Vec<MembershipRecord>>;

    /// Accounts matching every predicate, one page at a time.
    async fn search_accounts(
        &self,
        predicates: &[SearchField],
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<AccountRecord>>;

    async fn patch_custom_field(
        &self,
        account_id: &str,
        field: &str,
        value: &str,
    ) -> ProviderResult<()>;
}

// =============================================================================
// Access Control Trait
// =============================================================================

#[async_trait]
pub trait BaseAccessControl: Send + Sync {
    /// One page of users with their groups.
    async fn list_users(&self, offset: usize, limit: usize) -> ProviderResult<Page<User>>;

    async fn create_user(&self, request: &UserRequest) -> ProviderResult<User>;

    async fn update_user(&self, user_id: u64, request: &UserRequest) -> ProviderResult<()>;

    async fn get_group_ids(&self, user_id: u64) -> ProviderResult<Vec<u64>>;

    /// Replace the user's full group list.
    async fn set_group_ids(&self, user_id: u64, group_ids: &[u64]) -> ProviderResult<()>;

    async fn list_credentials(&self, user_id: u64) -> ProviderResult<Vec<Credential>>;

    async fn create_mobile_credential(
        &self,
        user_id: u64,
        credential_type_id: u64,
        name: &str,
    ) -> ProviderResult<Credential>;

    async fn activate_mobile_credential(&self, user_id: u64, credential_id: u64)
        -> ProviderResult<()>;

    async fn delete_credential(&self, user_id: u64, credential_id: u64) -> ProviderResult<()>;
}

// =============================================================================
// Forum Trait
// =============================================================================

#[async_trait]
pub trait BaseForum: Send + Sync {
    /// One page of usernames in the group.
    async fn list_group_members(
        &self,
        group_name: &str,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<String>>;

    async fn add_members(&self, group_id: u64, usernames: &[String]) -> ProviderResult<()>;

    async fn remove_members(&self, group_id: u64, usernames: &[String]) -> ProviderResult<()>;
}

// =============================================================================
// Marketing Segment Trait
// =============================================================================

#[async_trait]
pub trait BaseMarketingService: Send + Sync {
    /// One page of email addresses in the segment.
    async fn list_segment_members(
        &self,
        segment_id: u64,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<String>>;

    /// Add every email to every listed segment in one call.
    async fn add_to_segments(&self, emails: &[String], segment_ids: &[u64]) -> ProviderResult<()>;

    /// Remove every email from every listed segment in one call.
    async fn remove_from_segments(
        &self,
        emails: &[String],
        segment_ids: &[u64],
    ) -> ProviderResult<()>;
}
