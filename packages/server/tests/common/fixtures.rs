//! Test fixtures for CRM records and provider settings.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use crm_client::{AccountRecord, CustomField, MembershipLevel, MembershipRecord};
use rust_decimal::Decimal;
use server_core::config::SyncSettings;
use server_core::domains::access_control::AccessControlSettings;
use server_core::domains::entitlement::EntitlementPolicy;
use server_core::domains::forum::ForumSettings;
use server_core::domains::marketing::MarketingSettings;
use server_core::domains::membership::fields;
use server_core::kernel::RetryPolicy;

pub const SUBSCRIBER_GROUP: u64 = 10;
pub const EXCEPTION_GROUP: u64 = 20;
pub const MOBILE_CREDENTIAL_TYPE: u64 = 7;
pub const FORUM_GROUP_ID: u64 = 5;
pub const PRIMARY_MEMBERS_SEGMENT: u64 = 100;
pub const PRIMARY_ORIENTATION_SEGMENT: u64 = 101;
/// The secondary service has no orientation segment.
pub const SECONDARY_MEMBERS_SEGMENT: u64 = 200;
pub const PAGE_SIZE: usize = 100;

/// Fixed "now" for every run: midday, 1 June 2025.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

pub fn test_settings() -> SyncSettings {
    SyncSettings {
        policy: EntitlementPolicy::default(),
        page_size: PAGE_SIZE,
        concurrency: 4,
        retry: RetryPolicy::immediate(3),
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        maintenance: None,
        access_control: AccessControlSettings {
            subscriber_group_id: SUBSCRIBER_GROUP,
            exception_group_ids: vec![EXCEPTION_GROUP],
            mobile_credential_type_id: MOBILE_CREDENTIAL_TYPE,
            resurrection_age: Duration::from_secs(300),
        },
        forum: Some(ForumSettings {
            group_name: "members".to_string(),
            group_id: FORUM_GROUP_ID,
        }),
        primary_marketing: Some(MarketingSettings {
            name: "marketing_primary".to_string(),
            members_segment_id: PRIMARY_MEMBERS_SEGMENT,
            orientation_segment_id: Some(PRIMARY_ORIENTATION_SEGMENT),
        }),
        secondary_marketing: Some(MarketingSettings {
            name: "marketing_secondary".to_string(),
            members_segment_id: SECONDARY_MEMBERS_SEGMENT,
            orientation_segment_id: None,
        }),
    }
}

/// Account with a signed waiver and a completed facility tour.
pub fn cleared_account(id: &str, email: &str) -> AccountRecord {
    account(
        id,
        email,
        &[
            (fields::WAIVER_DATE, "2024-01-15"),
            (fields::ORIENTATION_DATE, "2024-02-01"),
        ],
    )
}

pub fn account(id: &str, email: &str, custom: &[(&str, &str)]) -> AccountRecord {
    AccountRecord {
        account_id: id.to_string(),
        first_name: Some("Test".to_string()),
        last_name: Some(format!("Member {id}")),
        email: Some(email.to_string()),
        custom_fields: custom
            .iter()
            .map(|(name, value)| CustomField {
                name: name.to_string(),
                value: Some(value.to_string()),
            })
            .collect(),
    }
}

/// Add or replace one custom field.
pub fn with_field(mut record: AccountRecord, name: &str, value: &str) -> AccountRecord {
    record.custom_fields.retain(|f| f.name != name);
    record.custom_fields.push(CustomField {
        name: name.to_string(),
        value: Some(value.to_string()),
    });
    record
}

/// A paid regular-tier term.
pub fn paid_term(id: &str, start: &str, end: &str) -> MembershipRecord {
    MembershipRecord {
        id: id.to_string(),
        term_start_date: Some(start.to_string()),
        term_end_date: Some(end.to_string()),
        status: Some("SUCCEEDED".to_string()),
        fee: Some(Decimal::new(4500, 2)),
        membership_level: Some(MembershipLevel {
            id: "lvl-regular".to_string(),
            name: Some("Individual Membership".to_string()),
        }),
        auto_renewal: Some(false),
    }
}
