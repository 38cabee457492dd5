//! CRM webhook events.
//!
//! Only the discriminator is typed. The body differs per kind, so the account
//! id is located by a bounded search instead of a fixed path.

use serde::Deserialize;
use serde_json::Value;

use crate::common::payload::{find_id, MAX_SEARCH_DEPTH};
use crate::domains::membership::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum EventKind {
    #[serde(rename = "createMembership")]
    MembershipCreated,
    #[serde(rename = "updateMembership")]
    MembershipUpdated,
    #[serde(rename = "deleteMembership")]
    MembershipDeleted,
    #[serde(rename = "editAccount")]
    AccountEdited,
    #[serde(rename = "mergeAccount")]
    AccountMerged,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrmEvent {
    #[serde(rename = "eventTrigger")]
    pub kind: EventKind,
    #[serde(default)]
    pub data: Value,
}

impl CrmEvent {
    /// The affected account. After a merge only the surviving account
    /// matters, wherever it sits in the payload.
    pub fn account_id(&self) -> Option<AccountId> {
        let found = match self.kind {
            EventKind::Unknown => return None,
            EventKind::AccountMerged => {
                find_id(&self.data, &["survivorAccountId"], MAX_SEARCH_DEPTH)
                    .or_else(|| find_id(&self.data, &["accountId"], MAX_SEARCH_DEPTH))
            }
            _ => find_id(&self.data, &["accountId"], MAX_SEARCH_DEPTH),
        };
        found.map(AccountId::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(body: Value) -> CrmEvent {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn membership_event_nests_account_id() {
        let e = event(json!({
            "eventTrigger": "updateMembership",
            "data": { "membership": { "id": "m9", "account": { "accountId": 1234 } } }
        }));

        assert_eq!(e.kind, EventKind::MembershipUpdated);
        assert_eq!(e.account_id(), Some(AccountId::new("1234")));
    }

    #[test]
    fn account_edit_has_top_level_id() {
        let e = event(json!({
            "eventTrigger": "editAccount",
            "data": { "accountId": "77", "individualAccount": { "accountId": "nested" } }
        }));
        assert_eq!(e.account_id(), Some(AccountId::new("77")));
    }

    #[test]
    fn merge_prefers_survivor() {
        let e = event(json!({
            "eventTrigger": "mergeAccount",
            "data": { "accountId": "old", "survivorAccountId": "new" }
        }));
        assert_eq!(e.account_id(), Some(AccountId::new("new")));
    }

    #[test]
    fn merge_prefers_survivor_nested_below_stale_id() {
        let e = event(json!({
            "eventTrigger": "mergeAccount",
            "data": { "accountId": "old", "mergeResult": { "survivorAccountId": "new" } }
        }));
        assert_eq!(e.account_id(), Some(AccountId::new("new")));
    }

    #[test]
    fn merge_without_survivor_falls_back_to_account_id() {
        let e = event(json!({
            "eventTrigger": "mergeAccount",
            "data": { "account": { "accountId": "42" } }
        }));
        assert_eq!(e.account_id(), Some(AccountId::new("42")));
    }

    #[test]
    fn unknown_kind_is_ignored() {
        let e = event(json!({
            "eventTrigger": "createDonation",
            "data": { "accountId": "5" }
        }));
        assert_eq!(e.kind, EventKind::Unknown);
        assert_eq!(e.account_id(), None);
    }

    #[test]
    fn missing_id_yields_none() {
        let e = event(json!({ "eventTrigger": "deleteMembership", "data": { "id": "m1" } }));
        assert_eq!(e.account_id(), None);
    }
}
