use std::collections::HashSet;
use std::sync::Arc;

use super::models::{partition, MarketingSettings, SegmentPartition};
use crate::common::{apply_in_batches, collect_all, diff, Scope, SyncReport};
use crate::kernel::{BaseMarketingService, ProviderResult, RetryPolicy};

#[derive(Debug, Clone, Copy)]
enum Direction {
    Add,
    Remove,
}

/// Member and orientation segments of one marketing service, keyed by email.
pub struct MarketingSegments {
    api: Arc<dyn BaseMarketingService>,
    settings: MarketingSettings,
    page_size: usize,
    retry: RetryPolicy,
}

impl MarketingSegments {
    pub fn new(
        api: Arc<dyn BaseMarketingService>,
        settings: MarketingSettings,
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

    pub fn name(&self) -> &str {
        &self.settings.name
    }

    async fn segment_members(&self, segment_id: u64) -> ProviderResult<HashSet<String>> {
        let emails = collect_all(self.page_size, |offset, limit| {
            self.retry.run("list_segment_members", move || {
                self.api.list_segment_members(segment_id, offset, limit)
            })
        })
        .await?;
        Ok(emails.into_iter().map(|e| e.to_lowercase()).collect())
    }

    /// Converge both segments. Changes are grouped so each distinct segment
    /// combination gets one batched call.
    pub async fn sync(
        &self,
        members: &HashSet<String>,
        oriented: &HashSet<String>,
        protected: &HashSet<String>,
        scope: &Scope<String>,
    ) -> SyncReport {
        let mut report = SyncReport::new(self.name());

        if matches!(scope, Scope::Only(emails) if emails.is_empty()) {
            return report;
        }

        let current_members = match self.segment_members(self.settings.members_segment_id).await {
            Ok(current) => scope.restrict(current),
            Err(e) => {
                tracing::error!(
                    provider = self.name(),
                    error = %e,
                    "Could not read members segment, skipping provider"
                );
                report.aborted = true;
                return report;
            }
        };
        let current_oriented = match self.settings.orientation_segment_id {
            Some(segment_id) => match self.segment_members(segment_id).await {
                Ok(current) => scope.restrict(current),
                Err(e) => {
                    tracing::error!(
                        provider = self.name(),
                        error = %e,
                        "Could not read orientation segment, skipping provider"
                    );
                    report.aborted = true;
                    return report;
                }
            },
            None => HashSet::new(),
        };

        let mut member_changes = diff(&scope.restrict(members.clone()), &current_members);
        let mut orientation_changes = match self.settings.orientation_segment_id {
            Some(_) => diff(&scope.restrict(oriented.clone()), &current_oriented),
            None => diff(&HashSet::new(), &HashSet::new()),
        };
        member_changes.to_remove.retain(|e| !protected.contains(e));
        orientation_changes.to_remove.retain(|e| !protected.contains(e));

        let adds = partition(&member_changes.to_add, &orientation_changes.to_add);
        let removes = partition(&member_changes.to_remove, &orientation_changes.to_remove);

        self.apply(Direction::Add, &adds, &mut report).await;
        self.apply(Direction::Remove, &removes, &mut report).await;

        tracing::info!(
            provider = self.name(),
            added = report.added,
            removed = report.removed,
            failed = report.failed,
            "Segment sync complete"
        );
        report
    }

    async fn apply(&self, direction: Direction, groups: &SegmentPartition, report: &mut SyncReport) {
        let members = self.settings.members_segment_id;
        let orientation = self.settings.orientation_segment_id;

        let mut calls: Vec<(&HashSet<String>, Vec<u64>)> = vec![];
        if let Some(orientation) = orientation {
            calls.push((&groups.both, vec![members, orientation]));
            calls.push((&groups.orientation_only, vec![orientation]));
        }
        calls.push((&groups.members_only, vec![members]));

        for (emails, segment_ids) in calls {
            if emails.is_empty() {
                continue;
            }
            let mut emails: Vec<String> = emails.iter().cloned().collect();
            emails.sort();
            let segment_ids = segment_ids.as_slice();

            let outcome = match direction {
                Direction::Add => {
                    apply_in_batches(
                        "add_to_segments",
                        &emails,
                        self.page_size,
                        &self.retry,
                        |batch| async move { self.api.add_to_segments(&batch, segment_ids).await },
                    )
                    .await
                }
                Direction::Remove => {
                    apply_in_batches(
                        "remove_from_segments",
                        &emails,
                        self.page_size,
                        &self.retry,
                        |batch| async move {
                            self.api.remove_from_segments(&batch, segment_ids).await
                        },
                    )
                    .await
                }
            };

            match direction {
                Direction::Add => report.added += outcome.applied,
                Direction::Remove => report.removed += outcome.applied,
            }
            report.failed += outcome.failed;
        }
    }
}
