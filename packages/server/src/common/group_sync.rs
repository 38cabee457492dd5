//! Provider-agnostic group synchronization.
//!
//! A [`GroupProvider`] knows how to list and mutate one external group;
//! [`sync_group`] computes the diff against the desired set and issues only
//! the calls needed to converge.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use async_trait::async_trait;
use serde::Serialize;

use super::group_diff::diff;
use crate::kernel::ProviderResult;

/// Which identities a run is allowed to touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope<I: Eq + Hash> {
    All,
    Only(HashSet<I>),
}

impl<I: Eq + Hash + Clone> Scope<I> {
    pub fn only(ids: impl IntoIterator<Item = I>) -> Self {
        Scope::Only(ids.into_iter().collect())
    }

    pub fn contains(&self, id: &I) -> bool {
        match self {
            Scope::All => true,
            Scope::Only(ids) => ids.contains(id),
        }
    }

    /// Drop everything outside the scope.
    pub fn restrict(&self, ids: HashSet<I>) -> HashSet<I> {
        match self {
            Scope::All => ids,
            Scope::Only(allowed) => ids.into_iter().filter(|id| allowed.contains(id)).collect(),
        }
    }
}

/// Outcome of reconciling one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub provider: String,
    pub added: usize,
    pub removed: usize,
    pub created: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
    /// Set when the current membership could not be read; nothing was changed.
    pub aborted: bool,
}

impl SyncReport {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Record a warning that needs a human; also emitted to the log.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(provider = %self.provider, "{}", message);
        self.warnings.push(message);
    }

    /// Fold counts and warnings from a report produced for the same provider
    /// earlier in the run.
    pub fn absorb(&mut self, earlier: SyncReport) {
        self.added += earlier.added;
        self.removed += earlier.removed;
        self.created += earlier.created;
        self.failed += earlier.failed;
        self.aborted |= earlier.aborted;
        let mut warnings = earlier.warnings;
        warnings.append(&mut self.warnings);
        self.warnings = warnings;
    }
}

#[async_trait]
pub trait GroupProvider: Send + Sync {
    type Identity: Eq + Hash + Clone + Display + Send + Sync;

    fn name(&self) -> &str;

    /// Current members of the managed group, restricted to `scope`.
    async fn current_members(
        &self,
        scope: &Scope<Self::Identity>,
    ) -> ProviderResult<HashSet<Self::Identity>>;

    /// Add identities; per-identity failures are counted in the report.
    async fn add(&self, identities: &HashSet<Self::Identity>, report: &mut SyncReport);

    /// Remove identities; per-identity failures are counted in the report.
    async fn remove(&self, identities: &HashSet<Self::Identity>, report: &mut SyncReport);
}

/// Converge `provider`'s group onto `desired` within `scope`.
///
/// Identities in `protected` are never removed during this run.
pub async fn sync_group<P>(
    provider: &P,
    desired: &HashSet<P::Identity>,
    protected: &HashSet<P::Identity>,
    scope: &Scope<P::Identity>,
) -> SyncReport
where
    P: GroupProvider + ?Sized,
{
    let mut report = SyncReport::new(provider.name());

    if matches!(scope, Scope::Only(ids) if ids.is_empty()) {
        return report;
    }

    let current = match provider.current_members(scope).await {
        Ok(current) => scope.restrict(current),
        Err(e) => {
            tracing::error!(
                provider = provider.name(),
                error = %e,
                "Could not read current group members, skipping provider"
            );
            report.aborted = true;
            return report;
        }
    };

    let desired = scope.restrict(desired.clone());
    let mut changes = diff(&desired, &current);

    changes.to_remove.retain(|id| {
        let keep = !protected.contains(id);
        if !keep {
            tracing::info!(
                provider = provider.name(),
                identity = %id,
                "Not removing identity of an account that failed evaluation"
            );
        }
        keep
    });

    if !changes.to_add.is_empty() {
        provider.add(&changes.to_add, &mut report).await;
    }
    if !changes.to_remove.is_empty() {
        provider.remove(&changes.to_remove, &mut report).await;
    }

    tracing::info!(
        provider = provider.name(),
        desired = desired.len(),
        current = current.len(),
        added = report.added,
        removed = report.removed,
        failed = report.failed,
        "Group sync complete"
    );

    report
}
