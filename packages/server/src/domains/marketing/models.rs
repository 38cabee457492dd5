use std::collections::HashSet;

/// Segment ids for one marketing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketingSettings {
    /// Label used in logs and reports, e.g. `marketing_primary`.
    pub name: String,
    pub members_segment_id: u64,
    pub orientation_segment_id: Option<u64>,
}

/// Emails split into three disjoint groups by which segments they target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentPartition {
    pub both: HashSet<String>,
    pub members_only: HashSet<String>,
    pub orientation_only: HashSet<String>,
}

impl SegmentPartition {
    pub fn is_empty(&self) -> bool {
        self.both.is_empty() && self.members_only.is_empty() && self.orientation_only.is_empty()
    }
}

/// Partition emails by whether they belong to the members change set, the
/// orientation change set, or both.
pub fn partition(members: &HashSet<String>, orientation: &HashSet<String>) -> SegmentPartition {
    SegmentPartition {
        both: members.intersection(orientation).cloned().collect(),
        members_only: members.difference(orientation).cloned().collect(),
        orientation_only: orientation.difference(members).cloned().collect(),
    }
}
