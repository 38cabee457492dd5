//! Drives entitlement evaluation and every provider sync for one run.
//!
//! A run evaluates each candidate account independently (concurrently, up to
//! the configured degree), writes the computed facility-access flag back to
//! the CRM, then converges each provider onto the desired sets. Per-account
//! failures are logged and skipped; the identities of skipped accounts are
//! protected from removal for the rest of the run.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use crm_client::{AccountRecord, SearchField};
use futures::stream::{self, StreamExt};
use tracing::Instrument;
use uuid::Uuid;

use super::candidates::gather_candidates;
use super::errors::ReconcileError;
use super::events::{CrmEvent, EventKind};
use super::report::ReconcileReport;
use crate::common::{collect_all, sync_group, GroupProvider, Scope, SyncReport};
use crate::config::SyncSettings;
use crate::domains::access_control::AccessControlGroup;
use crate::domains::entitlement::{evaluate, AccountEntitlement};
use crate::domains::forum::ForumGroup;
use crate::domains::marketing::MarketingSegments;
use crate::domains::membership::{decode_terms, fields, Account, AccountId};
use crate::kernel::{ProviderResult, ServerDeps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Batch,
    Single,
}

struct Evaluated {
    account: Account,
    entitlement: AccountEntitlement,
}

impl Evaluated {
    /// Forum and members-segment eligibility: a current membership, or a
    /// category that stands in for one.
    fn is_member(&self) -> bool {
        self.entitlement.valid_membership || self.account.category.is_bypass()
    }
}

/// Identities that must not be removed during this run.
#[derive(Debug, Default)]
struct Protected {
    user_ids: HashSet<u64>,
    usernames: HashSet<String>,
    emails: HashSet<String>,
}

impl Protected {
    /// Read identities straight from the raw records, since these accounts
    /// could not be decoded or evaluated.
    fn from_failures(failed: &[AccountRecord]) -> Self {
        let mut protected = Self::default();
        for record in failed {
            if let Some(id) = record
                .custom_field(fields::ACCESS_USER_ID)
                .and_then(|raw| raw.parse().ok())
            {
                protected.user_ids.insert(id);
            }
            if let Some(username) = record.custom_field(fields::FORUM_USERNAME) {
                protected.usernames.insert(username.to_lowercase());
            }
            if let Some(email) = record.email.as_deref().map(str::trim) {
                if !email.is_empty() {
                    protected.emails.insert(email.to_lowercase());
                }
            }
        }
        protected
    }
}

fn scope_for<I>(mode: RunMode, ids: impl IntoIterator<Item = I>) -> Scope<I>
where
    I: Eq + std::hash::Hash + Clone,
{
    match mode {
        RunMode::Batch => Scope::All,
        RunMode::Single => Scope::only(ids),
    }
}

pub struct Reconciler {
    deps: ServerDeps,
    settings: SyncSettings,
    access: AccessControlGroup,
    forum: Option<ForumGroup>,
    marketing: Vec<MarketingSegments>,
}

impl Reconciler {
    pub fn new(deps: ServerDeps, settings: SyncSettings) -> Self {
        let page_size = settings.page_size;
        let retry = settings.retry.clone();

        let access = AccessControlGroup::new(
            deps.access_control.clone(),
            settings.access_control.clone(),
            page_size,
            retry.clone(),
        );

        let forum = match (&deps.forum, &settings.forum) {
            (Some(api), Some(forum)) => Some(ForumGroup::new(
                api.clone(),
                forum.clone(),
                page_size,
                retry.clone(),
            )),
            (None, None) => None,
            _ => {
                tracing::warn!("Forum client or settings missing, forum sync disabled");
                None
            }
        };

        let marketing = [
            (&deps.primary_marketing, &settings.primary_marketing),
            (&deps.secondary_marketing, &settings.secondary_marketing),
        ]
        .into_iter()
        .filter_map(|(api, segments)| match (api, segments) {
            (Some(api), Some(segments)) => Some(MarketingSegments::new(
                api.clone(),
                segments.clone(),
                page_size,
                retry.clone(),
            )),
            (None, None) => None,
            _ => {
                tracing::warn!("Marketing client or settings missing, service disabled");
                None
            }
        })
        .collect();

        Self {
            deps,
            settings,
            access,
            forum,
            marketing,
        }
    }

    /// Calendar date in the organization's local offset.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.settings.utc_offset).date_naive()
    }

    /// Reconcile every candidate account.
    pub async fn run_batch(&self, now: DateTime<Utc>) -> Result<ReconcileReport, ReconcileError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("reconcile", %run_id, mode = "batch");

        async move {
            tracing::info!("Starting batch reconciliation");
            let records = gather_candidates(
                self.deps.crm.as_ref(),
                self.settings.page_size,
                &self.settings.retry,
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Could not gather candidates, aborting run"))?;
            tracing::info!(candidates = records.len(), "Candidates gathered");

            Ok(self.reconcile(run_id, records, RunMode::Batch, now).await)
        }
        .instrument(span)
        .await
    }

    /// Reconcile one account. Returns `None` inside the maintenance window.
    pub async fn run_single(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<Option<ReconcileReport>, ReconcileError> {
        if self
            .settings
            .maintenance
            .is_some_and(|window| window.contains(now))
        {
            tracing::info!(account_id = %account_id, "Inside maintenance window, skipping");
            return Ok(None);
        }

        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("reconcile", %run_id, mode = "single", account_id = %account_id);

        async move {
            let record = self
                .settings
                .retry
                .run("fetch_account", || {
                    self.deps.crm.fetch_account(account_id.as_str())
                })
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Could not fetch account"))?;

            Ok(Some(
                self.reconcile(run_id, vec![record], RunMode::Single, now)
                    .await,
            ))
        }
        .instrument(span)
        .await
    }

    /// Entry point for webhook events. Unknown kinds and events without an
    /// account id are logged no-ops.
    pub async fn handle_event(
        &self,
        event: &CrmEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<ReconcileReport>, ReconcileError> {
        if event.kind == EventKind::Unknown {
            tracing::debug!("Ignoring unhandled CRM event kind");
            return Ok(None);
        }
        let Some(account_id) = event.account_id() else {
            tracing::warn!(kind = ?event.kind, "CRM event without an account id, ignoring");
            return Ok(None);
        };

        tracing::info!(kind = ?event.kind, account_id = %account_id, "Reconciling account for CRM event");
        self.run_single(&account_id, now).await
    }

    async fn evaluate_record(
        &self,
        record: AccountRecord,
        today: NaiveDate,
    ) -> Result<Evaluated, (AccountRecord, ReconcileError)> {
        let result = async {
            let account = Account::try_from(&record)?;
            let memberships = self
                .settings
                .retry
                .run("fetch_memberships", || {
                    self.deps.crm.fetch_memberships(account.id.as_str())
                })
                .await?;
            let terms = decode_terms(&memberships)?;
            let entitlement = evaluate(&account, &terms, today, &self.settings.policy)?;
            Ok::<_, ReconcileError>(Evaluated {
                account,
                entitlement,
            })
        }
        .await;

        result.map_err(|e| (record, e))
    }

    async fn reconcile(
        &self,
        run_id: Uuid,
        records: Vec<AccountRecord>,
        mode: RunMode,
        now: DateTime<Utc>,
    ) -> ReconcileReport {
        let today = self.today(now);
        let mut report = ReconcileReport::new(run_id);

        let results: Vec<_> = stream::iter(records)
            .map(|record| self.evaluate_record(record, today))
            .buffer_unordered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut evaluated = Vec::new();
        let mut failed = Vec::new();
        for result in results {
            match result {
                Ok(e) => evaluated.push(e),
                Err((record, error)) => {
                    tracing::error!(
                        account_id = %record.account_id,
                        error = %error,
                        "Skipping account that failed evaluation"
                    );
                    failed.push(record);
                }
            }
        }
        evaluated.sort_by(|a, b| a.account.id.cmp(&b.account.id));
        report.evaluated = evaluated.len();
        report.skipped = failed.len();

        for e in evaluated.iter().filter(|e| e.entitlement.policy_exception) {
            tracing::info!(
                account_id = %e.account.id,
                category = e.account.category.label(),
                "Facility access granted to co-working tenant without a valid membership"
            );
            report.policy_exceptions += 1;
        }

        report.flags_patched = self.write_back_flags(&evaluated).await;

        let protected = Protected::from_failures(&failed);

        report
            .providers
            .push(self.sync_access(&mut evaluated, &protected, mode, now).await);

        if let Some(forum) = &self.forum {
            report
                .providers
                .push(sync_forum(forum, &evaluated, &protected, mode).await);
        }

        for segments in &self.marketing {
            report
                .providers
                .push(sync_marketing(segments, &evaluated, &protected, mode).await);
        }

        tracing::info!(
            evaluated = report.evaluated,
            skipped = report.skipped,
            flags_patched = report.flags_patched,
            warnings = report.warning_count(),
            "Reconciliation run complete"
        );
        report
    }

    async fn patch_field(&self, account_id: &AccountId, field: &str, value: &str) -> bool {
        match self
            .settings
            .retry
            .run("patch_custom_field", || {
                self.deps
                    .crm
                    .patch_custom_field(account_id.as_str(), field, value)
            })
            .await
        {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(account_id = %account_id, field, error = %e, "Failed to patch CRM field");
                false
            }
        }
    }

    /// Publish the computed facility-access flag where it changed.
    async fn write_back_flags(&self, evaluated: &[Evaluated]) -> usize {
        let mut patched = 0;
        for e in evaluated {
            let computed = e.entitlement.facility_access;
            if e.account.facility_access_flag == Some(computed) {
                continue;
            }
            let value = if computed { "Yes" } else { "No" };
            if self
                .patch_field(&e.account.id, fields::FACILITY_ACCESS, value)
                .await
            {
                patched += 1;
            }
        }
        patched
    }

    /// Every CRM account whose stored access-control user id is `user_id`.
    async fn accounts_bound_to(&self, user_id: u64) -> ProviderResult<Vec<String>> {
        let crm = self.deps.crm.as_ref();
        let predicates = [SearchField::equal(fields::ACCESS_USER_ID, user_id.to_string())];
        let predicates = predicates.as_slice();

        let found = collect_all(self.settings.page_size, |offset, limit| {
            self.settings.retry.run("search_accounts", move || {
                crm.search_accounts(predicates, offset, limit)
            })
        })
        .await?;

        Ok(found.into_iter().map(|r| r.account_id).collect())
    }

    async fn sync_access(
        &self,
        evaluated: &mut [Evaluated],
        protected: &Protected,
        mode: RunMode,
        now: DateTime<Utc>,
    ) -> SyncReport {
        let mut early = SyncReport::new(self.access.name());

        for e in evaluated.iter_mut() {
            if !e.entitlement.facility_access || e.account.access_user_id.is_some() {
                continue;
            }
            if let Some(user_id) = self.access.provision(&e.account, now, &mut early).await {
                e.account.access_user_id = Some(user_id);
                self.patch_field(&e.account.id, fields::ACCESS_USER_ID, &user_id.to_string())
                    .await;
            }
        }

        let mut bindings: BTreeMap<u64, Vec<String>> = BTreeMap::new();
        for e in evaluated.iter() {
            if let Some(user_id) = e.account.access_user_id {
                bindings
                    .entry(user_id)
                    .or_default()
                    .push(e.account.id.as_str().to_string());
            }
        }

        let mut never_remove = protected.user_ids.clone();
        let mut unverified = HashSet::new();
        if mode == RunMode::Single {
            for (user_id, accounts) in bindings.iter_mut() {
                match self.accounts_bound_to(*user_id).await {
                    Ok(found) => {
                        for id in found {
                            if !accounts.contains(&id) {
                                accounts.push(id);
                            }
                        }
                    }
                    Err(e) => {
                        early.warn(format!(
                            "could not check which accounts share access-control user {user_id}: {e}"
                        ));
                        never_remove.insert(*user_id);
                        unverified.insert(*user_id);
                    }
                }
            }
        }

        for (user_id, accounts) in bindings.iter().filter(|(_, a)| a.len() > 1) {
            early.warn(format!(
                "access-control user {user_id} is bound to accounts {}; resolve manually",
                accounts.join(", ")
            ));
            never_remove.insert(*user_id);
        }

        let desired: HashSet<u64> = evaluated
            .iter()
            .filter(|e| e.entitlement.facility_access)
            .filter_map(|e| e.account.access_user_id)
            .filter(|id| bindings.get(id).is_some_and(|a| a.len() == 1))
            .filter(|id| !unverified.contains(id))
            .collect();

        let scope = scope_for(
            mode,
            bindings
                .keys()
                .copied()
                .chain(protected.user_ids.iter().copied()),
        );

        let mut report = sync_group(&self.access, &desired, &never_remove, &scope).await;
        report.absorb(early);
        report
    }
}

async fn sync_forum(
    forum: &ForumGroup,
    evaluated: &[Evaluated],
    protected: &Protected,
    mode: RunMode,
) -> SyncReport {
    let desired: HashSet<String> = evaluated
        .iter()
        .filter(|e| e.is_member())
        .filter_map(|e| e.account.forum_username.clone())
        .collect();
    let scope = scope_for(
        mode,
        evaluated
            .iter()
            .filter_map(|e| e.account.forum_username.clone())
            .chain(protected.usernames.iter().cloned()),
    );

    sync_group(forum, &desired, &protected.usernames, &scope).await
}

async fn sync_marketing(
    segments: &MarketingSegments,
    evaluated: &[Evaluated],
    protected: &Protected,
    mode: RunMode,
) -> SyncReport {
    let members: HashSet<String> = evaluated
        .iter()
        .filter(|e| e.is_member())
        .filter_map(|e| e.account.email.clone())
        .collect();
    let oriented: HashSet<String> = evaluated
        .iter()
        .filter(|e| e.entitlement.oriented)
        .filter_map(|e| e.account.email.clone())
        .collect();
    let scope = scope_for(
        mode,
        evaluated
            .iter()
            .filter_map(|e| e.account.email.clone())
            .chain(protected.emails.iter().cloned()),
    );

    segments
        .sync(&members, &oriented, &protected.emails, &scope)
        .await
}
