//! Email marketing segments: one for members, optionally one for people who
//! completed orientation.

pub mod models;
pub mod provider;

pub use models::{partition, MarketingSettings, SegmentPartition};
pub use provider::MarketingSegments;
