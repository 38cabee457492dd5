//! Set difference between the desired and actual membership of a group.

use std::collections::HashSet;
use std::hash::Hash;

/// Minimal instructions that turn `current` into `desired`.
///
/// `to_add` and `to_remove` are always disjoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMembershipDiff<I: Eq + Hash> {
    pub to_add: HashSet<I>,
    pub to_remove: HashSet<I>,
}

impl<I: Eq + Hash> GroupMembershipDiff<I> {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// `to_add = desired − current`, `to_remove = current − desired`.
pub fn diff<I>(desired: &HashSet<I>, current: &HashSet<I>) -> GroupMembershipDiff<I>
where
    I: Eq + Hash + Clone,
{
    GroupMembershipDiff {
        to_add: desired.difference(current).cloned().collect(),
        to_remove: current.difference(desired).cloned().collect(),
    }
}
