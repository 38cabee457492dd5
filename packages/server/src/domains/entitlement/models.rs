use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::domains::membership::{AccountId, DecodeError};

/// Knobs that change who counts as entitled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitlementPolicy {
    /// Days after expiry an auto-renewing term keeps access while the renewal
    /// is processed. Zero disables the grace period.
    pub grace_period_days: u32,
    /// Waivers signed before this date are treated as unsigned.
    pub waiver_valid_since: Option<NaiveDate>,
}

impl Default for EntitlementPolicy {
    fn default() -> Self {
        Self {
            grace_period_days: 1,
            waiver_valid_since: None,
        }
    }
}

/// Paid vs comped status of the terms counted for one tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TierFlags {
    pub paid: bool,
    pub comped: bool,
}

/// Derived view of what an account is entitled to right now. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountEntitlement {
    pub account_id: AccountId,
    pub valid_membership: bool,
    pub ceramics_eligible: bool,
    pub regular: TierFlags,
    pub ceramics: TierFlags,
    pub earliest_start: NaiveDate,
    pub latest_expiration: NaiveDate,
    pub auto_renewal_pending: bool,
    pub facility_access: bool,
    /// Facility tour completed; drives the orientation marketing segment.
    pub oriented: bool,
    /// Access granted to a co-working tenant without a valid membership.
    pub policy_exception: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("succeeded term ends before it starts: {start} > {end}")]
    InvalidTerm { start: NaiveDate, end: NaiveDate },
}
