use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::common::{apply_in_batches, collect_all, GroupProvider, Scope, SyncReport};
use crate::kernel::{BaseForum, ProviderResult, RetryPolicy};

/// The forum addresses a group by name when listing and by id when mutating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumSettings {
    pub group_name: String,
    pub group_id: u64,
}

/// Members-only forum group, keyed by lowercased username.
pub struct ForumGroup {
    api: Arc<dyn BaseForum>,
    settings: ForumSettings,
    page_size: usize,
    retry: RetryPolicy,
}

impl ForumGroup {
    pub fn new(
        api: Arc<dyn BaseForum>,
        settings: ForumSettings,
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
}

fn sorted(usernames: &HashSet<String>) -> Vec<String> {
    let mut usernames: Vec<String> = usernames.iter().cloned().collect();
    usernames.sort();
    usernames
}

#[async_trait]
impl GroupProvider for ForumGroup {
    type Identity = String;

    fn name(&self) -> &str {
        "forum"
    }

    async fn current_members(&self, _scope: &Scope<String>) -> ProviderResult<HashSet<String>> {
        // No per-user lookup exists; the caller restricts the full listing.
        let group_name = self.settings.group_name.as_str();
        let usernames = collect_all(self.page_size, |offset, limit| {
            self.retry.run("list_group_members", move || {
                self.api.list_group_members(group_name, offset, limit)
            })
        })
        .await?;

        Ok(usernames.into_iter().map(|u| u.to_lowercase()).collect())
    }

    async fn add(&self, identities: &HashSet<String>, report: &mut SyncReport) {
        let group_id = self.settings.group_id;
        let outcome = apply_in_batches(
            "forum_add_members",
            &sorted(identities),
            self.page_size,
            &self.retry,
            |batch| async move { self.api.add_members(group_id, &batch).await },
        )
        .await;
        report.added += outcome.applied;
        report.failed += outcome.failed;
    }

    async fn remove(&self, identities: &HashSet<String>, report: &mut SyncReport) {
        let group_id = self.settings.group_id;
        let outcome = apply_in_batches(
            "forum_remove_members",
            &sorted(identities),
            self.page_size,
            &self.retry,
            |batch| async move { self.api.remove_members(group_id, &batch).await },
        )
        .await;
        report.removed += outcome.applied;
        report.failed += outcome.failed;
    }
}
