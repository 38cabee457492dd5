// Common types and utilities shared across the application

pub mod batch;
pub mod group_diff;
pub mod group_sync;
pub mod maintenance;
pub mod pagination;
pub mod payload;

pub use batch::{apply_in_batches, BatchOutcome};
pub use group_diff::{diff, GroupMembershipDiff};
pub use group_sync::{sync_group, GroupProvider, Scope, SyncReport};
pub use maintenance::MaintenanceWindow;
pub use pagination::{collect_all, Page};
