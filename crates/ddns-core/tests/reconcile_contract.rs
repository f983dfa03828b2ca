//! Contract Test: Record Reconciliation
//!
//! This test verifies that the reconciler writes only when needed and only
//! to the record it was asked about.
//!
//! Constraints verified:
//! - Reconciling twice with no outside change writes at most once
//! - Only the A record whose name equals the fqdn exactly is read or written
//! - Missing records are not created under the default policy
//! - An update is exactly one upsert replacing exactly one value
//!
//! If this test fails, the updater may be issuing redundant or wrong DNS writes.

mod common;

use common::*;
use ddns_core::reconcile::DEFAULT_RECORD_TTL;
use ddns_core::traits::{RecordRouting, ZoneId};
use ddns_core::{MissingRecordPolicy, ReconciliationOutcome, Reconciler};
use tokio_test::{assert_err, assert_ok};

fn zone() -> ZoneId {
    ZoneId::new("/hostedzone/Z123")
}

#[tokio::test]
async fn matching_record_is_left_alone() {
    // home.example.com -> 1.2.3.4, desired 1.2.3.4
    let provider = MockDnsProvider::new().with_record(a_record("home.example.com.", "1.2.3.4"));

    let outcome = assert_ok!(
        Reconciler::new(&provider)
            .reconcile(&zone(), "home.example.com.", ip("1.2.3.4"))
            .await
    );

    assert_eq!(
        outcome,
        ReconciliationOutcome::AlreadyCorrect {
            current: "1.2.3.4".to_string()
        }
    );
    assert_eq!(provider.upsert_count(), 0, "No write expected for a correct record");
}

#[tokio::test]
async fn stale_record_is_updated_with_one_upsert() {
    // home.example.com -> 1.2.3.4, desired 5.6.7.8
    let provider = MockDnsProvider::new().with_record(a_record("home.example.com.", "1.2.3.4"));

    let outcome = Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert!(
        matches!(&outcome, ReconciliationOutcome::Updated { previous, change_id }
            if previous == "1.2.3.4" && change_id.is_some()),
        "unexpected outcome: {:?}",
        outcome
    );

    let upserts = provider.upserts();
    assert_eq!(upserts.len(), 1, "Exactly one change submission expected");
    let (zone_id, submitted) = &upserts[0];
    assert_eq!(zone_id, &zone());
    assert_eq!(submitted.name, "home.example.com.");
    assert_eq!(submitted.values, vec!["5.6.7.8"]);
    assert_eq!(submitted.ttl, Some(300), "The rest of the record set is preserved");
}

#[tokio::test]
async fn only_first_value_is_replaced() {
    let provider = MockDnsProvider::new().with_record(record(
        "home.example.com.",
        "A",
        &["1.2.3.4", "10.0.0.1"],
    ));

    Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    let upserts = provider.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].1.values, vec!["5.6.7.8", "10.0.0.1"]);
}

#[tokio::test]
async fn weighted_record_is_replaced_with_its_routing_intact() {
    let mut weighted = a_record("home.example.com.", "1.2.3.4");
    weighted.routing = RecordRouting {
        set_identifier: Some("primary".to_string()),
        weight: Some(100),
        ..RecordRouting::default()
    };
    let provider = MockDnsProvider::new().with_record(weighted.clone());

    Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    let upserts = provider.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].1.routing, weighted.routing);
    assert_eq!(upserts[0].1.values, vec!["5.6.7.8"]);
}

#[tokio::test]
async fn second_reconcile_is_a_no_op() {
    let provider = MockDnsProvider::new().with_record(a_record("home.example.com.", "1.2.3.4"));
    let reconciler = Reconciler::new(&provider);

    let first = reconciler
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();
    let second = reconciler
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert!(matches!(first, ReconciliationOutcome::Updated { .. }));
    assert_eq!(
        second,
        ReconciliationOutcome::AlreadyCorrect {
            current: "5.6.7.8".to_string()
        }
    );
    assert_eq!(provider.upsert_count(), 1, "Second call must not write");
}

#[tokio::test]
async fn missing_record_is_not_created() {
    // Zone has home but no vpn
    let provider = MockDnsProvider::new().with_record(a_record("home.example.com.", "1.2.3.4"));

    let outcome = Reconciler::new(&provider)
        .reconcile(&zone(), "vpn.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert_eq!(outcome, ReconciliationOutcome::RecordNotFound);
    assert_eq!(provider.upsert_count(), 0);
    assert_eq!(provider.records().len(), 1, "No record may appear");
}

#[tokio::test]
async fn similar_names_and_other_types_are_never_touched() {
    let provider = MockDnsProvider::new()
        .with_record(a_record("home.example.com", "1.2.3.4"))
        .with_record(a_record("home2.example.com.", "1.2.3.4"))
        .with_record(a_record("x.home.example.com.", "1.2.3.4"))
        .with_record(record("home.example.com.", "AAAA", &["::1"]))
        .with_record(record("home.example.com.", "TXT", &["\"v=1\""]))
        .with_record(a_record("home.example.com.", "1.2.3.4"));
    let before = provider.records();

    Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    let upserts = provider.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].1.name, "home.example.com.");
    assert_eq!(upserts[0].1.record_type.as_str(), "A");

    // Everything except the target A record is unchanged
    let after = provider.records();
    assert_eq!(before[..5], after[..5]);
    assert_eq!(after[5].values, vec!["5.6.7.8"]);
}

#[tokio::test]
async fn record_without_values_is_treated_as_missing() {
    let provider = MockDnsProvider::new().with_record(record("home.example.com.", "A", &[]));

    let outcome = Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert_eq!(outcome, ReconciliationOutcome::RecordNotFound);
    assert_eq!(provider.upsert_count(), 0);
}

#[tokio::test]
async fn rejected_upsert_is_reported() {
    let provider = MockDnsProvider::new()
        .with_record(a_record("home.example.com.", "1.2.3.4"))
        .with_upsert_behavior(UpsertBehavior::Reject("InvalidChangeBatch".to_string()));

    let outcome = Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ReconciliationOutcome::Rejected {
            reason: "InvalidChangeBatch".to_string()
        }
    );
    assert_eq!(provider.upsert_count(), 1, "The write was attempted once");
}

#[tokio::test]
async fn upsert_transport_failure_is_reported_as_rejected() {
    let provider = MockDnsProvider::new()
        .with_record(a_record("home.example.com.", "1.2.3.4"))
        .with_upsert_behavior(UpsertBehavior::Fail("connection reset".to_string()));

    let outcome = Reconciler::new(&provider)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    match outcome {
        ReconciliationOutcome::Rejected { reason } => assert!(reason.contains("connection reset")),
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn record_listing_failure_propagates() {
    let provider = MockDnsProvider::new()
        .with_record(a_record("home.example.com.", "1.2.3.4"))
        .failing_record_listing_after(0);

    assert_err!(
        Reconciler::new(&provider)
            .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
            .await
    );
    assert_eq!(provider.upsert_count(), 0);
}

#[tokio::test]
async fn create_policy_creates_missing_record() {
    let provider = MockDnsProvider::new();

    let outcome = Reconciler::new(&provider)
        .with_missing_record_policy(MissingRecordPolicy::Create)
        .reconcile(&zone(), "vpn.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert!(matches!(outcome, ReconciliationOutcome::Created { .. }));
    let upserts = provider.upserts();
    assert_eq!(upserts.len(), 1);
    assert_eq!(upserts[0].1, common::a_record("vpn.example.com.", "5.6.7.8"));
    assert_eq!(upserts[0].1.ttl, Some(DEFAULT_RECORD_TTL));
}

#[tokio::test]
async fn create_policy_leaves_valueless_record_alone() {
    // An A record without values (e.g. an alias) must not be overwritten
    let provider = MockDnsProvider::new().with_record(record("home.example.com.", "A", &[]));

    let outcome = Reconciler::new(&provider)
        .with_missing_record_policy(MissingRecordPolicy::Create)
        .reconcile(&zone(), "home.example.com.", ip("5.6.7.8"))
        .await
        .unwrap();

    assert_eq!(outcome, ReconciliationOutcome::RecordNotFound);
    assert_eq!(provider.upsert_count(), 0);
}
