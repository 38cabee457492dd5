//! End-to-end reconciliation runs against in-memory providers.
//!
//! Each test seeds the CRM and the providers, runs the reconciler once (or
//! twice) and asserts on the exact calls the providers received.

mod common;

use chrono::{TimeZone, Utc};
use serde_json::json;
use server_core::common::MaintenanceWindow;
use server_core::domains::membership::{fields, AccountId};
use server_core::domains::reconciliation::CrmEvent;
use server_core::kernel::test_dependencies::{
    mobile_credential, AccessCall, MockAccessControl, MockForum, MockMarketingService,
    MockMembershipSource, SegmentCall, SegmentOp,
};
use server_core::kernel::TestDependencies;

use crate::common::*;

fn single_member_crm() -> MockMembershipSource {
    MockMembershipSource::new()
        .with_account(cleared_account("1001", "ada@example.org"))
        .with_memberships("1001", vec![paid_term("m1", "2025-01-01", "2025-12-31")])
}

fn emails(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

// =============================================================================
// Access control
// =============================================================================

#[tokio::test]
async fn paid_member_is_provisioned_and_granted_once() {
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(single_member_crm()));

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    let access = &harness.deps.access_control;
    let user = access.user_by_email("ada@example.org").expect("user created");
    assert_eq!(access.set_group_calls(), vec![(user.id, vec![SUBSCRIBER_GROUP])]);

    let summary = report.provider("access_control").unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.added, 1);
    assert_eq!(summary.removed, 0);
    assert_eq!(report.evaluated, 1);
    assert_eq!(report.skipped, 0);

    let crm = &harness.deps.crm;
    assert_eq!(
        crm.field("1001", fields::ACCESS_USER_ID),
        Some(user.id.to_string())
    );
    assert_eq!(crm.field("1001", fields::FACILITY_ACCESS).as_deref(), Some("Yes"));

    let credentials = access.credentials_of(user.id);
    assert_eq!(credentials.len(), 1);
    assert!(credentials[0].is_activated());
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(single_member_crm()));

    harness.reconciler.run_batch(now()).await.unwrap();
    let after_first = harness.deps.mutation_count();
    assert!(after_first > 0);

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(harness.deps.mutation_count(), after_first);
    assert_eq!(report.flags_patched, 0);
    assert_eq!(report.warning_count(), 0);
}

#[tokio::test]
async fn lapsed_subscriber_is_revoked() {
    let crm = MockMembershipSource::new()
        .with_account(with_field(
            cleared_account("2001", "lapsed@example.org"),
            fields::ACCESS_USER_ID,
            "502",
        ))
        .with_memberships("2001", vec![paid_term("m1", "2024-01-01", "2024-12-31")]);
    let access = MockAccessControl::new().with_user(
        502,
        "lapsed@example.org",
        Some("2001"),
        &[SUBSCRIBER_GROUP],
    );
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(
        harness.deps.access_control.set_group_calls(),
        vec![(502, vec![])]
    );
    assert_eq!(report.provider("access_control").unwrap().removed, 1);
    assert_eq!(
        harness.deps.crm.field("2001", fields::FACILITY_ACCESS).as_deref(),
        Some("No")
    );
}

#[tokio::test]
async fn exception_group_user_is_held_with_one_warning() {
    let crm = MockMembershipSource::new()
        .with_account(with_field(
            with_field(
                cleared_account("2002", "grace@example.org"),
                fields::ACCESS_USER_ID,
                "501",
            ),
            fields::FACILITY_ACCESS,
            "No",
        ))
        .with_memberships("2002", vec![paid_term("m1", "2024-01-01", "2024-12-31")]);
    let access = MockAccessControl::new().with_user(
        501,
        "grace@example.org",
        Some("2002"),
        &[EXCEPTION_GROUP],
    );
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert!(harness.deps.access_control.set_group_calls().is_empty());
    let summary = report.provider("access_control").unwrap();
    assert_eq!(summary.removed, 0);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("501"));
}

#[tokio::test]
async fn resurrected_user_has_stale_credentials_purged() {
    let crm = MockMembershipSource::new()
        .with_account(cleared_account("6001", "dana@example.org"))
        .with_memberships("6001", vec![paid_term("m1", "2025-01-01", "2025-12-31")]);
    let access = MockAccessControl::new()
        .with_deleted_user(
            900,
            "dana@example.org",
            Utc.with_ymd_and_hms(2021, 3, 1, 0, 0, 0).unwrap(),
        )
        .with_credential(900, mobile_credential(50, true));
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    harness.reconciler.run_batch(now()).await.unwrap();

    let access = &harness.deps.access_control;
    let calls = access.calls();
    assert!(calls.contains(&AccessCall::DeleteCredential {
        user_id: 900,
        credential_id: 50
    }));
    assert!(calls.contains(&AccessCall::UpdateUser { user_id: 900 }));

    let user = access.user_by_email("dana@example.org").unwrap();
    assert_eq!(user.id, 900);
    assert_eq!(user.external_id.as_deref(), Some("6001"));

    let credentials = access.credentials_of(900);
    assert_eq!(credentials.len(), 1);
    assert_ne!(credentials[0].id, 50);
    assert!(credentials[0].is_activated());
    assert_eq!(
        harness.deps.crm.field("6001", fields::ACCESS_USER_ID).as_deref(),
        Some("900")
    );
}

#[tokio::test]
async fn existing_activated_credential_is_kept() {
    let crm = MockMembershipSource::new()
        .with_account(with_field(
            cleared_account("6002", "eve@example.org"),
            fields::ACCESS_USER_ID,
            "910",
        ))
        .with_memberships("6002", vec![paid_term("m1", "2025-01-01", "2025-12-31")]);
    let access = MockAccessControl::new()
        .with_user(910, "eve@example.org", Some("6002"), &[])
        .with_credential(910, mobile_credential(60, false))
        .with_credential(910, mobile_credential(61, true));
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    harness.reconciler.run_batch(now()).await.unwrap();

    let access = &harness.deps.access_control;
    let remaining: Vec<u64> = access.credentials_of(910).iter().map(|c| c.id).collect();
    assert_eq!(remaining, vec![61]);
    assert!(!access
        .calls()
        .iter()
        .any(|c| matches!(c, AccessCall::CreateCredential { .. })));
}

#[tokio::test]
async fn activation_failure_is_reported_and_not_retried() {
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(single_member_crm())
            .mock_access_control(MockAccessControl::new().fail_activation()),
    );

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    let access = &harness.deps.access_control;
    let activations = access
        .calls()
        .into_iter()
        .filter(|c| matches!(c, AccessCall::ActivateCredential { .. }))
        .count();
    assert_eq!(activations, 1);

    let user = access.user_by_email("ada@example.org").unwrap();
    assert_eq!(access.groups_of(user.id), Some(vec![SUBSCRIBER_GROUP]));

    let summary = report.provider("access_control").unwrap();
    assert_eq!(summary.added, 1);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("not activated"));
}

#[tokio::test]
async fn rate_limited_calls_are_retried() {
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(single_member_crm())
            .mock_access_control(MockAccessControl::new().rate_limit_next(2)),
    );

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    let access = &harness.deps.access_control;
    let creates = access
        .calls()
        .into_iter()
        .filter(|c| matches!(c, AccessCall::CreateUser { .. }))
        .count();
    assert_eq!(creates, 3);
    assert_eq!(access.set_group_calls().len(), 1);
    assert_eq!(report.provider("access_control").unwrap().failed, 0);
}

#[tokio::test]
async fn shared_access_user_is_flagged_and_left_alone() {
    let crm = MockMembershipSource::new()
        .with_account(with_field(
            cleared_account("4001", "first@example.org"),
            fields::ACCESS_USER_ID,
            "701",
        ))
        .with_account(with_field(
            cleared_account("4002", "second@example.org"),
            fields::ACCESS_USER_ID,
            "701",
        ))
        .with_memberships("4001", vec![paid_term("m1", "2025-01-01", "2025-12-31")])
        .with_memberships("4002", vec![paid_term("m2", "2025-01-01", "2025-12-31")]);
    let access = MockAccessControl::new().with_user(701, "first@example.org", Some("4001"), &[]);
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert!(harness.deps.access_control.set_group_calls().is_empty());
    let summary = report.provider("access_control").unwrap();
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("701"));
    assert!(summary.warnings[0].contains("4001"));
    assert!(summary.warnings[0].contains("4002"));
}

#[tokio::test]
async fn co_working_tenant_counts_as_policy_exception() {
    let crm = MockMembershipSource::new().with_account(with_field(
        cleared_account("7001", "tenant@example.org"),
        fields::ACCOUNT_CATEGORY,
        "Co-Working Tenant",
    ));
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(crm));

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(report.policy_exceptions, 1);
    assert!(harness
        .deps
        .access_control
        .user_by_email("tenant@example.org")
        .is_some());
    // Not a member, so no forum or members-segment entry.
    assert!(harness
        .deps
        .secondary_marketing
        .segment(SECONDARY_MEMBERS_SEGMENT)
        .is_empty());
}

// =============================================================================
// Failure isolation
// =============================================================================

#[tokio::test]
async fn failed_evaluation_protects_identities_everywhere() {
    let record = with_field(
        with_field(
            cleared_account("3003", "bob@example.org"),
            fields::ACCESS_USER_ID,
            "601",
        ),
        fields::FORUM_USERNAME,
        "Bob",
    );
    let crm = MockMembershipSource::new()
        .with_account(record)
        .fail_memberships_for("3003");
    let deps = TestDependencies::new()
        .mock_crm(crm)
        .mock_access_control(MockAccessControl::new().with_user(
            601,
            "bob@example.org",
            Some("3003"),
            &[SUBSCRIBER_GROUP],
        ))
        .mock_forum(MockForum::new().with_members(["bob"]))
        .mock_primary_marketing(
            MockMarketingService::new().with_segment(PRIMARY_MEMBERS_SEGMENT, ["bob@example.org"]),
        );
    let harness = TestHarness::with_deps(deps);

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.evaluated, 0);
    assert!(harness.deps.access_control.set_group_calls().is_empty());
    assert!(harness.deps.forum.remove_calls().is_empty());
    assert!(harness.deps.primary_marketing.calls().is_empty());
    assert!(harness.deps.crm.patches().is_empty());
}

#[tokio::test]
async fn undecodable_account_does_not_stop_the_run() {
    let broken = with_field(
        cleared_account("8001", "broken@example.org"),
        fields::ACCOUNT_CATEGORY,
        "Astronaut",
    );
    let crm = single_member_crm()
        .with_account(with_field(broken, fields::ACCESS_USER_ID, "801"))
        .with_memberships("8001", vec![paid_term("m9", "2025-01-01", "2025-12-31")]);
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(crm));

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(report.evaluated, 1);
    assert_eq!(report.skipped, 1);
    assert!(harness
        .deps
        .access_control
        .user_by_email("ada@example.org")
        .is_some());
}

// =============================================================================
// Forum
// =============================================================================

#[tokio::test]
async fn forum_listing_stops_after_the_last_page() {
    let forum = MockForum::new().with_members((0..242).map(|i| format!("member{i:03}")));
    let harness = TestHarness::with_deps(TestDependencies::new().mock_forum(forum));

    harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(
        harness.deps.forum.list_calls(),
        vec![(0, PAGE_SIZE), (100, PAGE_SIZE), (200, PAGE_SIZE)]
    );
}

#[tokio::test]
async fn forum_listing_without_total_stops_on_short_page() {
    let forum = MockForum::new()
        .with_members((0..242).map(|i| format!("member{i:03}")))
        .without_total();
    let harness = TestHarness::with_deps(TestDependencies::new().mock_forum(forum));

    harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(harness.deps.forum.list_calls().len(), 3);
}

#[tokio::test]
async fn staff_join_forum_without_membership() {
    let staff = with_field(
        with_field(
            cleared_account("3001", "carol@example.org"),
            fields::ACCOUNT_CATEGORY,
            "Staff",
        ),
        fields::FORUM_USERNAME,
        "Carol",
    );
    let crm = MockMembershipSource::new().with_account(staff);
    let forum = MockForum::new().with_members(["former"]);
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(crm).mock_forum(forum));

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(harness.deps.forum.add_calls(), vec![emails(&["carol"])]);
    assert_eq!(harness.deps.forum.remove_calls(), vec![emails(&["former"])]);
    assert_eq!(
        harness.deps.forum.members().into_iter().collect::<Vec<_>>(),
        emails(&["carol"])
    );
    assert_eq!(report.policy_exceptions, 0);
}

#[tokio::test]
async fn rejected_forum_batch_falls_back_to_single_calls() {
    let mut crm = MockMembershipSource::new();
    for (id, username) in [("3101", "alpha"), ("3102", "bravo"), ("3103", "charlie")] {
        let record = with_field(
            with_field(
                cleared_account(id, &format!("{username}@example.org")),
                fields::ACCOUNT_CATEGORY,
                "Space Lead",
            ),
            fields::FORUM_USERNAME,
            username,
        );
        crm = crm.with_account(record);
    }
    let forum = MockForum::new().reject_username("bravo");
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(crm).mock_forum(forum));

    let report = harness.reconciler.run_batch(now()).await.unwrap();

    let summary = report.provider("forum").unwrap();
    assert_eq!(summary.added, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        harness.deps.forum.members().into_iter().collect::<Vec<_>>(),
        emails(&["alpha", "charlie"])
    );
}

// =============================================================================
// Marketing
// =============================================================================

#[tokio::test]
async fn segment_changes_are_grouped_by_target_segments() {
    let crm = MockMembershipSource::new()
        // Member who completed orientation.
        .with_account(cleared_account("5001", "a@example.org"))
        .with_memberships("5001", vec![paid_term("m1", "2025-01-01", "2025-12-31")])
        // Member without a facility tour.
        .with_account(account(
            "5002",
            "b@example.org",
            &[(fields::WAIVER_DATE, "2024-01-15")],
        ))
        .with_memberships("5002", vec![paid_term("m2", "2025-01-01", "2025-12-31")])
        // Oriented, but the membership has lapsed.
        .with_account(cleared_account("5003", "c@example.org"))
        .with_memberships("5003", vec![paid_term("m3", "2024-01-01", "2024-12-31")]);
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(crm));

    harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(
        harness.deps.primary_marketing.calls(),
        vec![
            SegmentCall {
                op: SegmentOp::Add,
                emails: emails(&["a@example.org"]),
                segment_ids: vec![PRIMARY_MEMBERS_SEGMENT, PRIMARY_ORIENTATION_SEGMENT],
            },
            SegmentCall {
                op: SegmentOp::Add,
                emails: emails(&["c@example.org"]),
                segment_ids: vec![PRIMARY_ORIENTATION_SEGMENT],
            },
            SegmentCall {
                op: SegmentOp::Add,
                emails: emails(&["b@example.org"]),
                segment_ids: vec![PRIMARY_MEMBERS_SEGMENT],
            },
        ]
    );
    assert_eq!(
        harness.deps.secondary_marketing.calls(),
        vec![SegmentCall {
            op: SegmentOp::Add,
            emails: emails(&["a@example.org", "b@example.org"]),
            segment_ids: vec![SECONDARY_MEMBERS_SEGMENT],
        }]
    );
}

#[tokio::test]
async fn departed_member_leaves_both_segments_in_one_call() {
    let marketing = MockMarketingService::new()
        .with_segment(PRIMARY_MEMBERS_SEGMENT, ["gone@example.org"])
        .with_segment(PRIMARY_ORIENTATION_SEGMENT, ["gone@example.org"]);
    let harness =
        TestHarness::with_deps(TestDependencies::new().mock_primary_marketing(marketing));

    harness.reconciler.run_batch(now()).await.unwrap();

    assert_eq!(
        harness.deps.primary_marketing.calls(),
        vec![SegmentCall {
            op: SegmentOp::Remove,
            emails: emails(&["gone@example.org"]),
            segment_ids: vec![PRIMARY_MEMBERS_SEGMENT, PRIMARY_ORIENTATION_SEGMENT],
        }]
    );
}

// =============================================================================
// Single-account runs
// =============================================================================

#[tokio::test]
async fn single_run_inside_maintenance_window_is_skipped() {
    let mut settings = test_settings();
    settings.maintenance = Some(MaintenanceWindow::parse("11:00-13:00", 0).unwrap());
    let harness = TestHarness::with_settings(
        TestDependencies::new().mock_crm(single_member_crm()),
        settings,
    );

    let report = harness
        .reconciler
        .run_single(&AccountId::new("1001"), now())
        .await
        .unwrap();

    assert!(report.is_none());
    assert_eq!(harness.deps.mutation_count(), 0);
}

#[tokio::test]
async fn single_run_leaves_other_identities_alone() {
    let deps = TestDependencies::new()
        .mock_crm(single_member_crm())
        .mock_access_control(MockAccessControl::new().with_user(
            999,
            "stranger@example.org",
            None,
            &[SUBSCRIBER_GROUP],
        ))
        .mock_forum(MockForum::new().with_members(["stranger"]))
        .mock_secondary_marketing(
            MockMarketingService::new()
                .with_segment(SECONDARY_MEMBERS_SEGMENT, ["stranger@example.org"]),
        );
    let harness = TestHarness::with_deps(deps);

    let report = harness
        .reconciler
        .run_single(&AccountId::new("1001"), now())
        .await
        .unwrap()
        .expect("outside maintenance window");

    assert_eq!(report.evaluated, 1);
    let access = &harness.deps.access_control;
    assert_eq!(access.groups_of(999), Some(vec![SUBSCRIBER_GROUP]));
    assert!(!access
        .calls()
        .iter()
        .any(|c| matches!(c, AccessCall::ListUsers { .. })));
    assert!(harness.deps.forum.remove_calls().is_empty());
    assert_eq!(
        harness
            .deps
            .secondary_marketing
            .segment(SECONDARY_MEMBERS_SEGMENT)
            .into_iter()
            .collect::<Vec<_>>(),
        emails(&["ada@example.org", "stranger@example.org"])
    );
}

#[tokio::test]
async fn single_run_does_not_revoke_user_shared_with_another_account() {
    let crm = MockMembershipSource::new()
        .with_account(with_field(
            cleared_account("4101", "lapsed@example.org"),
            fields::ACCESS_USER_ID,
            "701",
        ))
        .with_account(with_field(
            cleared_account("4102", "paid@example.org"),
            fields::ACCESS_USER_ID,
            "701",
        ))
        .with_memberships("4101", vec![paid_term("m1", "2024-01-01", "2024-12-31")])
        .with_memberships("4102", vec![paid_term("m2", "2025-01-01", "2025-12-31")]);
    let access = MockAccessControl::new().with_user(
        701,
        "paid@example.org",
        Some("4102"),
        &[SUBSCRIBER_GROUP],
    );
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    let report = harness
        .reconciler
        .run_single(&AccountId::new("4101"), now())
        .await
        .unwrap()
        .expect("outside maintenance window");

    let access = &harness.deps.access_control;
    assert!(access.set_group_calls().is_empty());
    assert_eq!(access.groups_of(701), Some(vec![SUBSCRIBER_GROUP]));
    let summary = report.provider("access_control").unwrap();
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("701"));
    assert!(summary.warnings[0].contains("4101"));
    assert!(summary.warnings[0].contains("4102"));
}

#[tokio::test]
async fn single_run_revokes_user_bound_only_to_that_account() {
    let crm = MockMembershipSource::new()
        .with_account(with_field(
            cleared_account("4201", "lapsed@example.org"),
            fields::ACCESS_USER_ID,
            "702",
        ))
        .with_memberships("4201", vec![paid_term("m1", "2024-01-01", "2024-12-31")]);
    let access = MockAccessControl::new().with_user(
        702,
        "lapsed@example.org",
        Some("4201"),
        &[SUBSCRIBER_GROUP],
    );
    let harness = TestHarness::with_deps(
        TestDependencies::new()
            .mock_crm(crm)
            .mock_access_control(access),
    );

    let report = harness
        .reconciler
        .run_single(&AccountId::new("4201"), now())
        .await
        .unwrap()
        .expect("outside maintenance window");

    assert_eq!(
        harness.deps.access_control.set_group_calls(),
        vec![(702, vec![])]
    );
    assert!(report.provider("access_control").unwrap().warnings.is_empty());
}

#[tokio::test]
async fn membership_event_reconciles_the_nested_account() {
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(single_member_crm()));
    let event: CrmEvent = serde_json::from_value(json!({
        "eventTrigger": "updateMembership",
        "data": { "membership": { "id": "m1", "account": { "accountId": 1001 } } }
    }))
    .unwrap();

    let report = harness
        .reconciler
        .handle_event(&event, now())
        .await
        .unwrap()
        .expect("event should trigger a run");

    assert_eq!(report.evaluated, 1);
    assert!(harness
        .deps
        .access_control
        .user_by_email("ada@example.org")
        .is_some());
    assert_eq!(harness.deps.crm.search_calls(), 0);
}

#[tokio::test]
async fn unknown_event_is_a_no_op() {
    let harness = TestHarness::with_deps(TestDependencies::new().mock_crm(single_member_crm()));
    let event: CrmEvent = serde_json::from_value(json!({
        "eventTrigger": "createInvoice",
        "data": { "accountId": "1001" }
    }))
    .unwrap();

    let report = harness.reconciler.handle_event(&event, now()).await.unwrap();

    assert!(report.is_none());
    assert_eq!(harness.deps.mutation_count(), 0);
}

#[tokio::test]
async fn event_for_missing_account_is_an_error() {
    let harness = TestHarness::new();
    let event: CrmEvent = serde_json::from_value(json!({
        "eventTrigger": "editAccount",
        "data": { "accountId": "404" }
    }))
    .unwrap();

    assert!(harness.reconciler.handle_event(&event, now()).await.is_err());
    assert_eq!(harness.deps.mutation_count(), 0);
}
