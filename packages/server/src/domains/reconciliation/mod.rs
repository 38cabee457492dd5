//! Batch and event-driven reconciliation runs.

pub mod candidates;
pub mod errors;
pub mod events;
pub mod orchestrator;
pub mod report;

pub use candidates::{candidate_predicates, gather_candidates};
pub use errors::ReconcileError;
pub use events::{CrmEvent, EventKind};
pub use orchestrator::Reconciler;
pub use report::ReconcileReport;
