use std::collections::HashSet;
use std::sync::Arc;

use access_control_client::{Credential, Identity, UserRequest};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{AccessAction, AccessControlSettings, AccessState};
use crate::common::{collect_all, GroupProvider, Scope, SyncReport};
use crate::domains::membership::Account;
use crate::kernel::{BaseAccessControl, ProviderResult, RetryPolicy};

/// Display name given to issued mobile credentials.
pub const MOBILE_CREDENTIAL_NAME: &str = "Member Mobile Key";

/// The subscriber group of the access-control platform, keyed by user id.
pub struct AccessControlGroup {
    api: Arc<dyn BaseAccessControl>,
    settings: AccessControlSettings,
    page_size: usize,
    retry: RetryPolicy,
}

impl AccessControlGroup {
    pub fn new(
        api: Arc<dyn BaseAccessControl>,
        settings: AccessControlSettings,
        page_size: usize,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            api,
            settings,
            page_size,
            retry,
        }
    }

    pub fn settings(&self) -> &AccessControlSettings {
        &self.settings
    }

    /// Create the user for an entitled account that has none yet.
    ///
    /// A user whose creation time is older than the resurrection threshold was
    /// not really created now; its stale credentials are purged and its
    /// name and external id rewritten before it is used.
    pub async fn provision(
        &self,
        account: &Account,
        now: DateTime<Utc>,
        report: &mut SyncReport,
    ) -> Option<u64> {
        let Some(email) = account.email.clone() else {
            report.warn(format!(
                "account {} should have facility access but has no email; cannot create a user",
                account.id
            ));
            return None;
        };

        let request = UserRequest {
            identity: Identity {
                email,
                first_name: Some(account.first_name.clone()),
                last_name: Some(account.last_name.clone()),
            },
            external_id: account.id.to_string(),
        };

        let user = match self
            .retry
            .run("create_user", || self.api.create_user(&request))
            .await
        {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(account_id = %account.id, error = %e, "Failed to create access-control user");
                report.failed += 1;
                return None;
            }
        };
        report.created += 1;

        let resurrected = now
            .signed_duration_since(user.created_at)
            .to_std()
            .map(|age| age > self.settings.resurrection_age)
            .unwrap_or(false);

        if resurrected {
            tracing::warn!(
                account_id = %account.id,
                user_id = user.id,
                created_at = %user.created_at,
                "Created user already existed; purging stale credentials"
            );
            let credentials = match self
                .retry
                .run("list_credentials", || self.api.list_credentials(user.id))
                .await
            {
                Ok(credentials) => credentials,
                Err(e) => {
                    report.warn(format!(
                        "could not list credentials of resurrected user {}: {e}",
                        user.id
                    ));
                    Vec::new()
                }
            };
            for credential in &credentials {
                self.delete_credential(user.id, credential, report).await;
            }
            if let Err(e) = self
                .retry
                .run("update_user", || self.api.update_user(user.id, &request))
                .await
            {
                tracing::error!(user_id = user.id, error = %e, "Failed to rewrite resurrected user");
                report.failed += 1;
            }
        }

        tracing::info!(account_id = %account.id, user_id = user.id, "Provisioned access-control user");
        Some(user.id)
    }

    async fn group_ids(&self, user_id: u64) -> ProviderResult<Vec<u64>> {
        self.retry
            .run("get_group_ids", || self.api.get_group_ids(user_id))
            .await
    }

    fn is_managed(&self, group_ids: &[u64]) -> bool {
        self.settings
            .managed_group_ids()
            .any(|managed| group_ids.contains(&managed))
    }

    async fn grant(&self, user_id: u64, report: &mut SyncReport) {
        let groups = match self.group_ids(user_id).await {
            Ok(groups) => groups,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to read groups before grant");
                report.failed += 1;
                return;
            }
        };

        if AccessState::classify(Some(&groups), &self.settings).transition(true)
            != AccessAction::Grant
        {
            return;
        }

        let mut updated = groups;
        updated.push(self.settings.subscriber_group_id);
        if let Err(e) = self
            .retry
            .run("set_group_ids", || self.api.set_group_ids(user_id, &updated))
            .await
        {
            tracing::error!(user_id, error = %e, "Failed to add user to subscriber group");
            report.failed += 1;
            return;
        }
        report.added += 1;
        tracing::info!(user_id, "Granted facility access");

        // Group membership is in place; credential trouble never undoes it.
        self.ensure_mobile_credential(user_id, report).await;
    }

    async fn revoke(&self, user_id: u64, report: &mut SyncReport) {
        let groups = match self.group_ids(user_id).await {
            Ok(groups) => groups,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to read groups before revoke");
                report.failed += 1;
                return;
            }
        };

        match AccessState::classify(Some(&groups), &self.settings).transition(false) {
            AccessAction::Revoke => {
                match self
                    .retry
                    .run("set_group_ids", || self.api.set_group_ids(user_id, &[]))
                    .await
                {
                    Ok(()) => {
                        report.removed += 1;
                        tracing::info!(user_id, "Revoked facility access");
                    }
                    Err(e) => {
                        tracing::error!(user_id, error = %e, "Failed to remove user from groups");
                        report.failed += 1;
                    }
                }
            }
            AccessAction::Hold => report.warn(format!(
                "user {user_id} no longer qualifies for facility access but is in an exception group; left unchanged"
            )),
            _ => {}
        }
    }

    /// Leave exactly one activated mobile credential on the user.
    async fn ensure_mobile_credential(&self, user_id: u64, report: &mut SyncReport) {
        let credentials = match self
            .retry
            .run("list_credentials", || self.api.list_credentials(user_id))
            .await
        {
            Ok(credentials) => credentials,
            Err(e) => {
                report.warn(format!("could not list credentials for user {user_id}: {e}"));
                return;
            }
        };

        let mobile: Vec<&Credential> = credentials.iter().filter(|c| c.is_mobile()).collect();
        let keep = mobile.iter().find(|c| c.is_activated()).map(|c| c.id);

        for stale in mobile.iter().filter(|c| Some(c.id) != keep) {
            self.delete_credential(user_id, stale, report).await;
        }
        if keep.is_some() {
            return;
        }

        let credential = match self
            .retry
            .run("create_mobile_credential", || {
                self.api.create_mobile_credential(
                    user_id,
                    self.settings.mobile_credential_type_id,
                    MOBILE_CREDENTIAL_NAME,
                )
            })
            .await
        {
            Ok(credential) => credential,
            Err(e) => {
                report.warn(format!("could not create mobile credential for user {user_id}: {e}"));
                return;
            }
        };

        // Activation sends the invitation; a second attempt could send two.
        if let Err(e) = self
            .api
            .activate_mobile_credential(user_id, credential.id)
            .await
        {
            tracing::error!(
                user_id,
                credential_id = credential.id,
                error = %e,
                "Mobile credential created but not activated"
            );
            report.warn(format!(
                "mobile credential {} for user {user_id} was created but not activated; needs manual follow-up",
                credential.id
            ));
        }
    }

    async fn delete_credential(&self, user_id: u64, credential: &Credential, report: &mut SyncReport) {
        match self
            .retry
            .run("delete_credential", || {
                self.api.delete_credential(user_id, credential.id)
            })
            .await
        {
            Ok(()) => tracing::debug!(user_id, credential_id = credential.id, "Deleted stale credential"),
            Err(e) => report.warn(format!(
                "could not delete credential {} of user {user_id}: {e}",
                credential.id
            )),
        }
    }
}

fn sorted(ids: &HashSet<u64>) -> Vec<u64> {
    let mut ids: Vec<u64> = ids.iter().copied().collect();
    ids.sort_unstable();
    ids
}

#[async_trait]
impl GroupProvider for AccessControlGroup {
    type Identity = u64;

    fn name(&self) -> &str {
        "access_control"
    }

    async fn current_members(&self, scope: &Scope<u64>) -> ProviderResult<HashSet<u64>> {
        match scope {
            Scope::All => {
                let users = collect_all(self.page_size, |offset, limit| {
                    self.retry
                        .run("list_users", move || self.api.list_users(offset, limit))
                })
                .await?;
                Ok(users
                    .into_iter()
                    .filter(|u| self.is_managed(&u.group_ids()))
                    .map(|u| u.id)
                    .collect())
            }
            Scope::Only(ids) => {
                let mut members = HashSet::new();
                for user_id in sorted(ids) {
                    if self.is_managed(&self.group_ids(user_id).await?) {
                        members.insert(user_id);
                    }
                }
                Ok(members)
            }
        }
    }

    async fn add(&self, identities: &HashSet<u64>, report: &mut SyncReport) {
        for user_id in sorted(identities) {
            self.grant(user_id, report).await;
        }
    }

    async fn remove(&self, identities: &HashSet<u64>, report: &mut SyncReport) {
        for user_id in sorted(identities) {
            self.revoke(user_id, report).await;
        }
    }
}
