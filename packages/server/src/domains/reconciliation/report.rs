use serde::Serialize;
use uuid::Uuid;

use crate::common::SyncReport;

/// Summary of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub run_id: Uuid,
    pub evaluated: usize,
    /// Accounts whose evaluation failed; their identities were not removed.
    pub skipped: usize,
    pub policy_exceptions: usize,
    pub flags_patched: usize,
    pub providers: Vec<SyncReport>,
}

impl ReconcileReport {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            evaluated: 0,
            skipped: 0,
            policy_exceptions: 0,
            flags_patched: 0,
            providers: Vec::new(),
        }
    }

    pub fn provider(&self, name: &str) -> Option<&SyncReport> {
        self.providers.iter().find(|p| p.provider == name)
    }

    pub fn warning_count(&self) -> usize {
        self.providers.iter().map(|p| p.warnings.len()).sum()
    }
}
