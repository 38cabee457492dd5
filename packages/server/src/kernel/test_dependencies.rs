// TestDependencies - in-memory providers for testing
//
// Each mock keeps real state (so a second reconciliation run sees the effect
// of the first) and records every call for assertions.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use access_control_client::{
    Credential, CredentialType, GroupRef, Identity, MobileCredential, User, UserRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use crm_client::{AccountRecord, CustomField, MembershipRecord, SearchField, SearchOperator};

use super::{
    BaseAccessControl, BaseForum, BaseMarketingService, BaseMembershipSource, ProviderError,
    ProviderResult, ServerDeps,
};
use crate::common::Page;
use crate::domains::membership::fields;

fn page_of<T: Clone>(items: &[T], offset: usize, limit: usize, total: Option<usize>) -> Page<T> {
    let slice = items.iter().skip(offset).take(limit).cloned().collect();
    Page::new(slice, total)
}

/// Pops one injected rate limit, if any are queued.
fn take_rate_limit(remaining: &Mutex<u32>) -> ProviderResult<()> {
    let mut remaining = remaining.lock().unwrap();
    if *remaining > 0 {
        *remaining -= 1;
        return Err(ProviderError::RateLimited { retry_after: None });
    }
    Ok(())
}

// =============================================================================
// Mock Membership Source (CRM)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchCall {
    pub account_id: String,
    pub field: String,
    pub value: String,
}

pub struct MockMembershipSource {
    accounts: Arc<Mutex<BTreeMap<String, AccountRecord>>>,
    memberships: Arc<Mutex<HashMap<String, Vec<MembershipRecord>>>>,
    failing_memberships: Arc<Mutex<HashSet<String>>>,
    patches: Arc<Mutex<Vec<PatchCall>>>,
    search_calls: Arc<Mutex<usize>>,
}

impl MockMembershipSource {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(BTreeMap::new())),
            memberships: Arc::new(Mutex::new(HashMap::new())),
            failing_memberships: Arc::new(Mutex::new(HashSet::new())),
            patches: Arc::new(Mutex::new(Vec::new())),
            search_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_account(self, record: AccountRecord) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .insert(record.account_id.clone(), record);
        self
    }

    pub fn with_memberships(self, account_id: &str, records: Vec<MembershipRecord>) -> Self {
        self.memberships
            .lock()
            .unwrap()
            .insert(account_id.to_string(), records);
        self
    }

    /// Membership history requests for this account fail with a server error.
    pub fn fail_memberships_for(self, account_id: &str) -> Self {
        self.failing_memberships
            .lock()
            .unwrap()
            .insert(account_id.to_string());
        self
    }

    pub fn patches(&self) -> Vec<PatchCall> {
        self.patches.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        *self.search_calls.lock().unwrap()
    }

    /// Current value of a custom field on a stored account.
    pub fn field(&self, account_id: &str, name: &str) -> Option<String> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .and_then(|a| a.custom_field(name).map(str::to_string))
    }

    fn matches(&self, record: &AccountRecord, predicate: &SearchField) -> bool {
        let present = if predicate.field == fields::MEMBERSHIP_EXPIRATION {
            self.memberships
                .lock()
                .unwrap()
                .get(&record.account_id)
                .is_some_and(|m| !m.is_empty())
        } else {
            record.custom_field(&predicate.field).is_some()
        };

        match predicate.operator {
            SearchOperator::NotBlank => present,
            SearchOperator::Blank => !present,
            SearchOperator::Equal => {
                record.custom_field(&predicate.field) == predicate.value.as_deref()
            }
        }
    }
}

impl Default for MockMembershipSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseMembershipSource for MockMembershipSource {
    async fn fetch_account(&self, account_id: &str) -> ProviderResult<AccountRecord> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                body: format!("account {account_id} not found"),
            })
    }

    async fn fetch_memberships(&self, account_id: &str) -> ProviderResult<Vec<MembershipRecord>> {
        if self.failing_memberships.lock().unwrap().contains(account_id) {
            return Err(ProviderError::Api {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .get(account_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_accounts(
        &self,
        predicates: &[SearchField],
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<AccountRecord>> {
        *self.search_calls.lock().unwrap() += 1;

        let all: Vec<AccountRecord> = self.accounts.lock().unwrap().values().cloned().collect();
        let found: Vec<AccountRecord> = all
            .into_iter()
            .filter(|r| predicates.iter().all(|p| self.matches(r, p)))
            .collect();
        Ok(page_of(&found, offset, limit, Some(found.len())))
    }

    async fn patch_custom_field(
        &self,
        account_id: &str,
        field: &str,
        value: &str,
    ) -> ProviderResult<()> {
        self.patches.lock().unwrap().push(PatchCall {
            account_id: account_id.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        });

        let mut accounts = self.accounts.lock().unwrap();
        let record = accounts.get_mut(account_id).ok_or_else(|| ProviderError::Api {
            status: 404,
            body: format!("account {account_id} not found"),
        })?;
        match record.custom_fields.iter_mut().find(|f| f.name == field) {
            Some(existing) => existing.value = Some(value.to_string()),
            None => record.custom_fields.push(CustomField {
                name: field.to_string(),
                value: Some(value.to_string()),
            }),
        }
        Ok(())
    }
}

// =============================================================================
// Mock Access Control
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessCall {
    ListUsers { offset: usize, limit: usize },
    CreateUser { email: String },
    UpdateUser { user_id: u64 },
    GetGroupIds { user_id: u64 },
    SetGroupIds { user_id: u64, group_ids: Vec<u64> },
    ListCredentials { user_id: u64 },
    CreateCredential { user_id: u64 },
    ActivateCredential { user_id: u64, credential_id: u64 },
    DeleteCredential { user_id: u64, credential_id: u64 },
}

impl AccessCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            AccessCall::ListUsers { .. }
                | AccessCall::GetGroupIds { .. }
                | AccessCall::ListCredentials { .. }
        )
    }
}

/// A mobile credential as the platform would report it.
pub fn mobile_credential(id: u64, activated: bool) -> Credential {
    Credential {
        id,
        credential_type: CredentialType {
            id: 7,
            model_name: "mobile".to_string(),
        },
        mobile: Some(MobileCredential {
            name: Some("Member Mobile Key".to_string()),
            provisioned_at: activated.then(Utc::now),
        }),
    }
}

pub struct MockAccessControl {
    users: Arc<Mutex<BTreeMap<u64, User>>>,
    /// Users that were deleted but come back when an account with the same
    /// email is created again.
    deleted: Arc<Mutex<Vec<User>>>,
    credentials: Arc<Mutex<HashMap<u64, Vec<Credential>>>>,
    next_id: Arc<Mutex<u64>>,
    calls: Arc<Mutex<Vec<AccessCall>>>,
    rate_limits: Arc<Mutex<u32>>,
    fail_activation: Arc<Mutex<bool>>,
}

impl MockAccessControl {
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(BTreeMap::new())),
            deleted: Arc::new(Mutex::new(Vec::new())),
            credentials: Arc::new(Mutex::new(HashMap::new())),
            next_id: Arc::new(Mutex::new(1_000)),
            calls: Arc::new(Mutex::new(Vec::new())),
            rate_limits: Arc::new(Mutex::new(0)),
            fail_activation: Arc::new(Mutex::new(false)),
        }
    }

    fn user(
        id: u64,
        email: &str,
        external_id: Option<&str>,
        groups: &[u64],
        created_at: DateTime<Utc>,
    ) -> User {
        User {
            id,
            identity: Identity {
                email: email.to_string(),
                first_name: None,
                last_name: None,
            },
            external_id: external_id.map(str::to_string),
            created_at,
            groups: groups
                .iter()
                .map(|&id| GroupRef { id, name: None })
                .collect(),
        }
    }

    /// An existing user, created a month ago.
    pub fn with_user(
        self,
        id: u64,
        email: &str,
        external_id: Option<&str>,
        groups: &[u64],
    ) -> Self {
        let user = Self::user(id, email, external_id, groups, Utc::now() - Duration::days(30));
        self.users.lock().unwrap().insert(id, user);
        self
    }

    /// A deleted user that the platform revives on the next create with this email.
    pub fn with_deleted_user(self, id: u64, email: &str, created_at: DateTime<Utc>) -> Self {
        let user = Self::user(id, email, Some("stale"), &[], created_at);
        self.deleted.lock().unwrap().push(user);
        self
    }

    pub fn with_credential(self, user_id: u64, credential: Credential) -> Self {
        self.credentials
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .push(credential);
        self
    }

    /// The next `count` calls of any kind are rate limited.
    pub fn rate_limit_next(self, count: u32) -> Self {
        *self.rate_limits.lock().unwrap() = count;
        self
    }

    pub fn fail_activation(self) -> Self {
        *self.fail_activation.lock().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<AccessCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<AccessCall> {
        self.calls().into_iter().filter(AccessCall::is_mutation).collect()
    }

    pub fn set_group_calls(&self) -> Vec<(u64, Vec<u64>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                AccessCall::SetGroupIds { user_id, group_ids } => Some((user_id, group_ids)),
                _ => None,
            })
            .collect()
    }

    pub fn groups_of(&self, user_id: u64) -> Option<Vec<u64>> {
        self.users
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|u| u.group_ids())
    }

    pub fn credentials_of(&self, user_id: u64) -> Vec<Credential> {
        self.credentials
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.identity.email == email)
            .cloned()
    }

    fn record(&self, call: AccessCall) -> ProviderResult<()> {
        self.calls.lock().unwrap().push(call);
        take_rate_limit(&self.rate_limits)
    }

    fn not_found(user_id: u64) -> ProviderError {
        ProviderError::Api {
            status: 404,
            body: format!("user {user_id} not found"),
        }
    }
}

impl Default for MockAccessControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAccessControl for MockAccessControl {
    async fn list_users(&self, offset: usize, limit: usize) -> ProviderResult<Page<User>> {
        self.record(AccessCall::ListUsers { offset, limit })?;
        let users: Vec<User> = self.users.lock().unwrap().values().cloned().collect();
        Ok(page_of(&users, offset, limit, Some(users.len())))
    }

    async fn create_user(&self, request: &UserRequest) -> ProviderResult<User> {
        self.record(AccessCall::CreateUser {
            email: request.identity.email.clone(),
        })?;

        if self.user_by_email(&request.identity.email).is_some() {
            return Err(ProviderError::Api {
                status: 409,
                body: "email already in use".to_string(),
            });
        }

        let mut deleted = self.deleted.lock().unwrap();
        let user = match deleted
            .iter()
            .position(|u| u.identity.email == request.identity.email)
        {
            Some(index) => deleted.remove(index),
            None => {
                let mut next_id = self.next_id.lock().unwrap();
                *next_id += 1;
                Self::user(
                    *next_id,
                    &request.identity.email,
                    Some(&request.external_id),
                    &[],
                    Utc::now(),
                )
            }
        };
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, user_id: u64, request: &UserRequest) -> ProviderResult<()> {
        self.record(AccessCall::UpdateUser { user_id })?;
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or_else(|| Self::not_found(user_id))?;
        user.identity = request.identity.clone();
        user.external_id = Some(request.external_id.clone());
        Ok(())
    }

    async fn get_group_ids(&self, user_id: u64) -> ProviderResult<Vec<u64>> {
        self.record(AccessCall::GetGroupIds { user_id })?;
        self.groups_of(user_id).ok_or_else(|| Self::not_found(user_id))
    }

    async fn set_group_ids(&self, user_id: u64, group_ids: &[u64]) -> ProviderResult<()> {
        self.record(AccessCall::SetGroupIds {
            user_id,
            group_ids: group_ids.to_vec(),
        })?;
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or_else(|| Self::not_found(user_id))?;
        user.groups = group_ids
            .iter()
            .map(|&id| GroupRef { id, name: None })
            .collect();
        Ok(())
    }

    async fn list_credentials(&self, user_id: u64) -> ProviderResult<Vec<Credential>> {
        self.record(AccessCall::ListCredentials { user_id })?;
        Ok(self.credentials_of(user_id))
    }

    async fn create_mobile_credential(
        &self,
        user_id: u64,
        credential_type_id: u64,
        name: &str,
    ) -> ProviderResult<Credential> {
        self.record(AccessCall::CreateCredential { user_id })?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let credential = Credential {
            id: *next_id,
            credential_type: CredentialType {
                id: credential_type_id,
                model_name: "mobile".to_string(),
            },
            mobile: Some(MobileCredential {
                name: Some(name.to_string()),
                provisioned_at: None,
            }),
        };
        self.credentials
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .push(credential.clone());
        Ok(credential)
    }

    async fn activate_mobile_credential(
        &self,
        user_id: u64,
        credential_id: u64,
    ) -> ProviderResult<()> {
        self.record(AccessCall::ActivateCredential {
            user_id,
            credential_id,
        })?;
        if *self.fail_activation.lock().unwrap() {
            return Err(ProviderError::Api {
                status: 500,
                body: "invitation service unavailable".to_string(),
            });
        }
        let mut credentials = self.credentials.lock().unwrap();
        let credential = credentials
            .get_mut(&user_id)
            .and_then(|list| list.iter_mut().find(|c| c.id == credential_id))
            .ok_or_else(|| Self::not_found(user_id))?;
        if let Some(mobile) = credential.mobile.as_mut() {
            mobile.provisioned_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_credential(&self, user_id: u64, credential_id: u64) -> ProviderResult<()> {
        self.record(AccessCall::DeleteCredential {
            user_id,
            credential_id,
        })?;
        if let Some(list) = self.credentials.lock().unwrap().get_mut(&user_id) {
            list.retain(|c| c.id != credential_id);
        }
        Ok(())
    }
}

// =============================================================================
// Mock Forum
// =============================================================================

pub struct MockForum {
    members: Arc<Mutex<BTreeSet<String>>>,
    rejected_usernames: Arc<Mutex<HashSet<String>>>,
    report_total: Arc<Mutex<bool>>,
    list_calls: Arc<Mutex<Vec<(usize, usize)>>>,
    add_calls: Arc<Mutex<Vec<Vec<String>>>>,
    remove_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockForum {
    pub fn new() -> Self {
        Self {
            members: Arc::new(Mutex::new(BTreeSet::new())),
            rejected_usernames: Arc::new(Mutex::new(HashSet::new())),
            report_total: Arc::new(Mutex::new(true)),
            list_calls: Arc::new(Mutex::new(Vec::new())),
            add_calls: Arc::new(Mutex::new(Vec::new())),
            remove_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_members<I, S>(self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members
            .lock()
            .unwrap()
            .extend(usernames.into_iter().map(Into::into));
        self
    }

    /// Any batch containing this username is rejected.
    pub fn reject_username(self, username: &str) -> Self {
        self.rejected_usernames
            .lock()
            .unwrap()
            .insert(username.to_string());
        self
    }

    /// Listing pages omit the total, so only a short page ends pagination.
    pub fn without_total(self) -> Self {
        *self.report_total.lock().unwrap() = false;
        self
    }

    pub fn members(&self) -> BTreeSet<String> {
        self.members.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<(usize, usize)> {
        self.list_calls.lock().unwrap().clone()
    }

    pub fn add_calls(&self) -> Vec<Vec<String>> {
        self.add_calls.lock().unwrap().clone()
    }

    pub fn remove_calls(&self) -> Vec<Vec<String>> {
        self.remove_calls.lock().unwrap().clone()
    }

    fn check_batch(&self, usernames: &[String]) -> ProviderResult<()> {
        let rejected = self.rejected_usernames.lock().unwrap();
        match usernames.iter().find(|u| rejected.contains(*u)) {
            Some(bad) => Err(rejected_err(bad)),
            None => Ok(()),
        }
    }
}

fn rejected_err(username: &str) -> ProviderError {
    ProviderError::Api {
        status: 422,
        body: format!("{username} is not a valid username"),
    }
}

impl Default for MockForum {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseForum for MockForum {
    async fn list_group_members(
        &self,
        _group_name: &str,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<String>> {
        self.list_calls.lock().unwrap().push((offset, limit));
        let members: Vec<String> = self.members.lock().unwrap().iter().cloned().collect();
        let total = (*self.report_total.lock().unwrap()).then_some(members.len());
        Ok(page_of(&members, offset, limit, total))
    }

    async fn add_members(&self, _group_id: u64, usernames: &[String]) -> ProviderResult<()> {
        self.add_calls.lock().unwrap().push(usernames.to_vec());
        self.check_batch(usernames)?;
        self.members
            .lock()
            .unwrap()
            .extend(usernames.iter().cloned());
        Ok(())
    }

    async fn remove_members(&self, _group_id: u64, usernames: &[String]) -> ProviderResult<()> {
        self.remove_calls.lock().unwrap().push(usernames.to_vec());
        self.check_batch(usernames)?;
        let mut members = self.members.lock().unwrap();
        for username in usernames {
            members.remove(username);
        }
        Ok(())
    }
}

// =============================================================================
// Mock Marketing Service
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentOp {
    Add,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentCall {
    pub op: SegmentOp,
    pub emails: Vec<String>,
    pub segment_ids: Vec<u64>,
}

pub struct MockMarketingService {
    segments: Arc<Mutex<HashMap<u64, BTreeSet<String>>>>,
    calls: Arc<Mutex<Vec<SegmentCall>>>,
    list_calls: Arc<Mutex<usize>>,
}

impl MockMarketingService {
    pub fn new() -> Self {
        Self {
            segments: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            list_calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_segment<I, S>(self, segment_id: u64, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments
            .lock()
            .unwrap()
            .entry(segment_id)
            .or_default()
            .extend(emails.into_iter().map(Into::into));
        self
    }

    pub fn segment(&self, segment_id: u64) -> BTreeSet<String> {
        self.segments
            .lock()
            .unwrap()
            .get(&segment_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<SegmentCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    fn apply(&self, op: SegmentOp, emails: &[String], segment_ids: &[u64]) {
        self.calls.lock().unwrap().push(SegmentCall {
            op,
            emails: emails.to_vec(),
            segment_ids: segment_ids.to_vec(),
        });
        let mut segments = self.segments.lock().unwrap();
        for segment_id in segment_ids {
            let segment = segments.entry(*segment_id).or_default();
            for email in emails {
                match op {
                    SegmentOp::Add => segment.insert(email.clone()),
                    SegmentOp::Remove => segment.remove(email),
                };
            }
        }
    }
}

impl Default for MockMarketingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseMarketingService for MockMarketingService {
    async fn list_segment_members(
        &self,
        segment_id: u64,
        offset: usize,
        limit: usize,
    ) -> ProviderResult<Page<String>> {
        *self.list_calls.lock().unwrap() += 1;
        let emails: Vec<String> = self.segment(segment_id).into_iter().collect();
        Ok(page_of(&emails, offset, limit, Some(emails.len())))
    }

    async fn add_to_segments(&self, emails: &[String], segment_ids: &[u64]) -> ProviderResult<()> {
        self.apply(SegmentOp::Add, emails, segment_ids);
        Ok(())
    }

    async fn remove_from_segments(
        &self,
        emails: &[String],
        segment_ids: &[u64],
    ) -> ProviderResult<()> {
        self.apply(SegmentOp::Remove, emails, segment_ids);
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

#[derive(Clone)]
pub struct TestDependencies {
    pub crm: Arc<MockMembershipSource>,
    pub access_control: Arc<MockAccessControl>,
    pub forum: Arc<MockForum>,
    pub primary_marketing: Arc<MockMarketingService>,
    pub secondary_marketing: Arc<MockMarketingService>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            crm: Arc::new(MockMembershipSource::new()),
            access_control: Arc::new(MockAccessControl::new()),
            forum: Arc::new(MockForum::new()),
            primary_marketing: Arc::new(MockMarketingService::new()),
            secondary_marketing: Arc::new(MockMarketingService::new()),
        }
    }

    pub fn mock_crm(mut self, crm: MockMembershipSource) -> Self {
        self.crm = Arc::new(crm);
        self
    }

    pub fn mock_access_control(mut self, access_control: MockAccessControl) -> Self {
        self.access_control = Arc::new(access_control);
        self
    }

    pub fn mock_forum(mut self, forum: MockForum) -> Self {
        self.forum = Arc::new(forum);
        self
    }

    pub fn mock_primary_marketing(mut self, service: MockMarketingService) -> Self {
        self.primary_marketing = Arc::new(service);
        self
    }

    pub fn mock_secondary_marketing(mut self, service: MockMarketingService) -> Self {
        self.secondary_marketing = Arc::new(service);
        self
    }

    /// Provider handles backed by these mocks.
    pub fn server_deps(&self) -> ServerDeps {
        ServerDeps::new(
            self.crm.clone(),
            self.access_control.clone(),
            Some(self.forum.clone()),
            Some(self.primary_marketing.clone()),
            Some(self.secondary_marketing.clone()),
        )
    }

    /// Every call that changed provider or CRM state.
    pub fn mutation_count(&self) -> usize {
        let forum = self.forum.add_calls().len() + self.forum.remove_calls().len();
        self.crm.patches().len()
            + self.access_control.mutations().len()
            + forum
            + self.primary_marketing.calls().len()
            + self.secondary_marketing.calls().len()
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
