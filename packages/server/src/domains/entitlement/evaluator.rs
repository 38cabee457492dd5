use chrono::NaiveDate;

use super::models::{AccountEntitlement, EntitlementError, EntitlementPolicy, TierFlags};
use crate::domains::membership::{Account, AccountCategory, MembershipTerm, Tier};

/// Reported start/expiration for accounts with no succeeded terms.
pub const SENTINEL_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    Some(date) => date,
    None => panic!("invalid sentinel date"),
};

/// Compute an account's entitlement as of `today`.
///
/// Only succeeded terms count. Overlapping terms are aggregated by the
/// earliest start and the latest end; the tier is read from the term with the
/// latest end. Pure: the same inputs always produce the same entitlement.
pub fn evaluate(
    account: &Account,
    terms: &[MembershipTerm],
    today: NaiveDate,
    policy: &EntitlementPolicy,
) -> Result<AccountEntitlement, EntitlementError> {
    let succeeded: Vec<&MembershipTerm> = terms.iter().filter(|t| t.is_succeeded()).collect();

    if let Some(bad) = succeeded.iter().find(|t| t.start > t.end) {
        return Err(EntitlementError::InvalidTerm {
            start: bad.start,
            end: bad.end,
        });
    }

    let earliest_start = succeeded
        .iter()
        .map(|t| t.start)
        .min()
        .unwrap_or(SENTINEL_EPOCH);
    let latest = succeeded.iter().max_by_key(|t| (t.end, t.auto_renew)).copied();
    let latest_expiration = latest.map(|t| t.end).unwrap_or(SENTINEL_EPOCH);

    let mut counted: Vec<&MembershipTerm> =
        succeeded.iter().copied().filter(|t| t.covers(today)).collect();
    let mut valid_membership = !counted.is_empty();
    let mut auto_renewal_pending = false;

    if !valid_membership {
        if let Some(latest) = latest.filter(|t| in_grace_period(t, terms, today, policy)) {
            tracing::debug!(
                account_id = %account.id,
                expired = %latest.end,
                "Membership in renewal grace period"
            );
            valid_membership = true;
            auto_renewal_pending = true;
            counted.push(latest);
        }
    }

    let mut regular = TierFlags::default();
    let mut ceramics = TierFlags::default();
    for term in &counted {
        let flags = match term.tier {
            Tier::Regular => &mut regular,
            Tier::Ceramics => &mut ceramics,
        };
        if term.is_comped() {
            flags.comped = true;
        } else {
            flags.paid = true;
        }
    }

    let ceramics_eligible =
        valid_membership && latest.map(|t| t.tier == Tier::Ceramics).unwrap_or(false);

    let waiver_signed = match (account.waiver_signed, policy.waiver_valid_since) {
        (Some(signed), Some(since)) => signed >= since,
        (Some(_), None) => true,
        (None, _) => false,
    };
    let oriented = account.orientation_date.is_some();
    let cleared = waiver_signed && oriented && !account.suspended;

    let by_membership = valid_membership && cleared;
    let by_category = account.category.is_bypass();
    let by_tenancy = account.category == AccountCategory::CoWorkingTenant && cleared;
    let policy_exception = by_tenancy && !by_membership && !by_category;

    Ok(AccountEntitlement {
        account_id: account.id.clone(),
        valid_membership,
        ceramics_eligible,
        regular,
        ceramics,
        earliest_start,
        latest_expiration,
        auto_renewal_pending,
        facility_access: by_membership || by_category || by_tenancy,
        oriented,
        policy_exception,
    })
}

/// Expired within the grace window, set to auto-renew, and no later settled
/// term shows the renewal was already processed. A renewal still pending
/// payment keeps the grace.
fn in_grace_period(
    latest: &MembershipTerm,
    all_terms: &[MembershipTerm],
    today: NaiveDate,
    policy: &EntitlementPolicy,
) -> bool {
    let days_since_expiry = (today - latest.end).num_days();
    latest.auto_renew
        && days_since_expiry >= 1
        && days_since_expiry <= i64::from(policy.grace_period_days)
        && !all_terms
            .iter()
            .any(|t| t.is_settled() && t.start > latest.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::membership::{AccountId, PaymentStatus};
    use rust_decimal::Decimal;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn account() -> Account {
        Account {
            id: AccountId::new("1"),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: Some("grace@example.org".into()),
            category: AccountCategory::Regular,
            waiver_signed: Some(day(2024, 1, 1)),
            orientation_date: Some(day(2024, 1, 2)),
            suspended: false,
            access_user_id: None,
            forum_username: None,
            facility_access_flag: None,
        }
    }

    fn term(start: NaiveDate, end: NaiveDate) -> MembershipTerm {
        MembershipTerm {
            id: format!("{start}"),
            start,
            end,
            status: PaymentStatus::Succeeded,
            fee: Decimal::new(5000, 2),
            level_id: None,
            tier: Tier::Regular,
            auto_renew: false,
        }
    }

    fn eval(account: &Account, terms: &[MembershipTerm], today: NaiveDate) -> AccountEntitlement {
        evaluate(account, terms, today, &EntitlementPolicy::default()).unwrap()
    }

    #[test]
    fn no_terms_yields_sentinel() {
        let e = eval(&account(), &[], day(2025, 6, 1));

        assert!(!e.valid_membership);
        assert!(!e.facility_access);
        assert_eq!(e.latest_expiration, SENTINEL_EPOCH);
        assert_eq!(e.earliest_start, SENTINEL_EPOCH);
    }

    #[test]
    fn only_failed_terms_are_ignored() {
        let mut t = term(day(2025, 1, 1), day(2025, 12, 31));
        t.status = PaymentStatus::Failed;

        let e = eval(&account(), &[t], day(2025, 6, 1));
        assert!(!e.valid_membership);
        assert_eq!(e.latest_expiration, SENTINEL_EPOCH);
    }

    #[test]
    fn covering_term_grants_access() {
        let e = eval(&account(), &[term(day(2025, 1, 1), day(2025, 12, 31))], day(2025, 6, 1));

        assert!(e.valid_membership);
        assert!(e.facility_access);
        assert!(e.regular.paid);
        assert!(!e.regular.comped);
        assert!(!e.policy_exception);
    }

    #[test]
    fn term_boundaries_are_inclusive() {
        let terms = [term(day(2025, 1, 1), day(2025, 1, 31))];
        assert!(eval(&account(), &terms, day(2025, 1, 1)).valid_membership);
        assert!(eval(&account(), &terms, day(2025, 1, 31)).valid_membership);
    }

    #[test]
    fn overlapping_terms_aggregate_min_and_max() {
        let terms = [
            term(day(2025, 3, 1), day(2025, 3, 31)),
            term(day(2025, 1, 1), day(2025, 6, 30)),
            term(day(2025, 2, 1), day(2025, 4, 30)),
        ];
        let e = eval(&account(), &terms, day(2025, 5, 15));

        assert!(e.valid_membership);
        assert_eq!(e.earliest_start, day(2025, 1, 1));
        assert_eq!(e.latest_expiration, day(2025, 6, 30));
    }

    #[test]
    fn grace_period_covers_day_after_expiry() {
        let mut t = term(day(2025, 5, 1), day(2025, 5, 31));
        t.auto_renew = true;

        let e = eval(&account(), &[t], day(2025, 6, 1));
        assert!(e.valid_membership);
        assert!(e.auto_renewal_pending);
        assert!(e.facility_access);
    }

    #[test]
    fn no_grace_two_days_after_expiry() {
        let mut t = term(day(2025, 5, 1), day(2025, 5, 31));
        t.auto_renew = true;

        let e = eval(&account(), &[t], day(2025, 6, 2));
        assert!(!e.valid_membership);
        assert!(!e.auto_renewal_pending);
    }

    #[test]
    fn no_grace_without_auto_renew() {
        let e = eval(&account(), &[term(day(2025, 5, 1), day(2025, 5, 31))], day(2025, 6, 1));
        assert!(!e.valid_membership);
    }

    #[test]
    fn no_grace_when_newer_term_exists() {
        let mut expired = term(day(2025, 5, 1), day(2025, 5, 31));
        expired.auto_renew = true;
        let mut renewal = term(day(2025, 6, 1), day(2025, 6, 30));
        renewal.status = PaymentStatus::Failed;

        let e = eval(&account(), &[expired, renewal], day(2025, 6, 1));
        assert!(!e.valid_membership);
    }

    #[test]
    fn pending_renewal_keeps_grace() {
        let mut expired = term(day(2025, 5, 1), day(2025, 5, 31));
        expired.auto_renew = true;
        let mut renewal = term(day(2025, 6, 1), day(2025, 6, 30));
        renewal.status = PaymentStatus::Pending;

        let e = eval(&account(), &[expired, renewal], day(2025, 6, 1));
        assert!(e.valid_membership);
        assert!(e.auto_renewal_pending);
        assert_eq!(e.latest_expiration, day(2025, 5, 31));
    }

    #[test]
    fn grace_window_is_configurable() {
        let mut t = term(day(2025, 5, 1), day(2025, 5, 31));
        t.auto_renew = true;
        let policy = EntitlementPolicy {
            grace_period_days: 3,
            ..Default::default()
        };

        let e = evaluate(&account(), &[t], day(2025, 6, 3), &policy).unwrap();
        assert!(e.auto_renewal_pending);
    }

    #[test]
    fn ceramics_tier_comes_from_latest_term() {
        let mut ceramics = term(day(2025, 1, 1), day(2025, 12, 31));
        ceramics.tier = Tier::Ceramics;
        ceramics.fee = Decimal::ZERO;
        let regular = term(day(2025, 1, 1), day(2025, 6, 30));

        let e = eval(&account(), &[regular, ceramics], day(2025, 3, 1));
        assert!(e.ceramics_eligible);
        assert!(e.ceramics.comped);
        assert!(e.regular.paid);
    }

    #[test]
    fn missing_waiver_or_tour_blocks_access() {
        let terms = [term(day(2025, 1, 1), day(2025, 12, 31))];

        let mut no_waiver = account();
        no_waiver.waiver_signed = None;
        assert!(!eval(&no_waiver, &terms, day(2025, 6, 1)).facility_access);

        let mut no_tour = account();
        no_tour.orientation_date = None;
        let e = eval(&no_tour, &terms, day(2025, 6, 1));
        assert!(e.valid_membership);
        assert!(!e.facility_access);
        assert!(!e.oriented);
    }

    #[test]
    fn stale_waiver_does_not_count() {
        let policy = EntitlementPolicy {
            waiver_valid_since: Some(day(2024, 6, 1)),
            ..Default::default()
        };
        let terms = [term(day(2025, 1, 1), day(2025, 12, 31))];

        let e = evaluate(&account(), &terms, day(2025, 6, 1), &policy).unwrap();
        assert!(!e.facility_access);
    }

    #[test]
    fn suspension_blocks_access() {
        let mut a = account();
        a.suspended = true;
        let e = eval(&a, &[term(day(2025, 1, 1), day(2025, 12, 31))], day(2025, 6, 1));
        assert!(!e.facility_access);
    }

    #[test]
    fn staff_bypass_membership() {
        let mut a = account();
        a.category = AccountCategory::Staff;
        a.waiver_signed = None;
        a.suspended = true;

        let e = eval(&a, &[], day(2025, 6, 1));
        assert!(e.facility_access);
        assert!(!e.policy_exception);
    }

    #[test]
    fn co_working_tenant_is_a_policy_exception() {
        let mut a = account();
        a.category = AccountCategory::CoWorkingTenant;

        let e = eval(&a, &[term(day(2024, 1, 1), day(2024, 12, 31))], day(2025, 6, 1));
        assert!(!e.valid_membership);
        assert!(e.facility_access);
        assert!(e.policy_exception);

        a.suspended = true;
        assert!(!eval(&a, &[], day(2025, 6, 1)).facility_access);
    }

    #[test]
    fn inverted_succeeded_term_is_an_error() {
        let err = evaluate(
            &account(),
            &[term(day(2025, 2, 1), day(2025, 1, 1))],
            day(2025, 6, 1),
            &EntitlementPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EntitlementError::InvalidTerm { .. }));
    }
}
