use std::collections::BTreeMap;

use crm_client::{AccountRecord, SearchField};

use crate::common::collect_all;
use crate::domains::membership::{fields, AccountCategory};
use crate::kernel::{BaseMembershipSource, ProviderResult, RetryPolicy};

/// Searches whose union is every account a batch run must look at: anyone
/// with a membership history, anyone in a category that can hold access
/// without one, and anyone already bound to an access-control user.
pub fn candidate_predicates() -> Vec<Vec<SearchField>> {
    let mut searches = vec![vec![SearchField::not_blank(fields::MEMBERSHIP_EXPIRATION)]];
    for category in [
        AccountCategory::Staff,
        AccountCategory::SpaceLead,
        AccountCategory::CoWorkingTenant,
    ] {
        searches.push(vec![SearchField::equal(
            fields::ACCOUNT_CATEGORY,
            category.label(),
        )]);
    }
    searches.push(vec![SearchField::not_blank(fields::ACCESS_USER_ID)]);
    searches
}

/// Run every candidate search to completion and dedupe by account id.
/// Any failed search fails the whole gather.
pub async fn gather_candidates(
    crm: &dyn BaseMembershipSource,
    page_size: usize,
    retry: &RetryPolicy,
) -> ProviderResult<Vec<AccountRecord>> {
    let mut accounts = BTreeMap::new();

    for predicates in candidate_predicates() {
        let predicates = predicates.as_slice();
        let found = collect_all(page_size, |offset, limit| {
            retry.run("search_accounts", move || {
                crm.search_accounts(predicates, offset, limit)
            })
        })
        .await?;

        tracing::debug!(
            search = ?predicates.iter().map(|p| p.field.as_str()).collect::<Vec<_>>(),
            found = found.len(),
            "Candidate search complete"
        );
        for record in found {
            accounts.entry(record.account_id.clone()).or_insert(record);
        }
    }

    Ok(accounts.into_values().collect())
}
