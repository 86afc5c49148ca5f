//! Unit tests for plant sync vendor selection, upsert planning and
//! summary aggregation.
//!
//! Run with: cargo test --test plant_sync_test

use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use serde_json::json;
use uuid::Uuid;

use helio_sync::entity::sync_runs::{SyncKind, SyncTrigger};
use helio_sync::entity::vendors::VendorType;
use helio_sync::entity::{organizations, plants, vendors};
use helio_sync::sync::plants::{eligible_vendors, partition_records};
use helio_sync::sync::{aggregate, SyncSummary, VendorOutcome};
use helio_sync::vendor::PlantRecord;

fn org(name: &str, auto_sync_enabled: bool, sync_interval_minutes: i32) -> organizations::Model {
    organizations::Model {
        id: Uuid::new_v4(),
        name: name.to_string(),
        auto_sync_enabled,
        sync_interval_minutes,
        created_at: None,
        updated_at: None,
    }
}

fn vendor(org: &organizations::Model, name: &str, is_active: bool) -> vendors::Model {
    vendors::Model {
        id: Uuid::new_v4(),
        organization_id: org.id,
        name: name.to_string(),
        vendor_type: VendorType::Solarman,
        credentials: json!({}),
        base_url: None,
        is_active,
        last_synced_at: None,
        last_alert_synced_at: None,
        created_at: None,
        updated_at: None,
    }
}

fn record(vendor_plant_id: &str, name: &str) -> PlantRecord {
    PlantRecord {
        vendor_plant_id: vendor_plant_id.to_string(),
        name: name.to_string(),
        address: None,
        capacity_kw: Some(100.0),
        current_power_kw: None,
        daily_energy_kwh: None,
        monthly_energy_kwh: None,
        yearly_energy_kwh: None,
        total_energy_kwh: None,
        performance_ratio: None,
        network_status: None,
        last_update_time: None,
    }
}

fn stored_plant(vendor_id: Uuid, org_id: Uuid, vendor_plant_id: &str) -> plants::Model {
    plants::Model {
        id: Uuid::new_v4(),
        vendor_id,
        organization_id: org_id,
        vendor_plant_id: vendor_plant_id.to_string(),
        name: "stored".to_string(),
        address: None,
        capacity_kw: None,
        current_power_kw: None,
        daily_energy_kwh: None,
        monthly_energy_kwh: None,
        yearly_energy_kwh: None,
        total_energy_kwh: None,
        performance_ratio: None,
        network_status: None,
        last_update_time: None,
        created_at: None,
        updated_at: None,
    }
}

fn outcome(name: &str, success: bool, synced: u32, created: u32, updated: u32) -> VendorOutcome {
    VendorOutcome {
        vendor_id: Uuid::new_v4(),
        vendor_name: name.to_string(),
        vendor_type: VendorType::Solarman,
        success,
        synced,
        created,
        updated,
        resolved: None,
        error: if success {
            None
        } else {
            Some("boom".to_string())
        },
        row_errors: Vec::new(),
    }
}

#[test]
fn only_due_and_active_vendors_are_selected() {
    let enabled = org("enabled", true, 15);
    let disabled = org("disabled", false, 15);

    let v_active = vendor(&enabled, "active", true);
    let v_inactive = vendor(&enabled, "inactive", false);
    let v_disabled_org = vendor(&disabled, "of disabled org", true);

    // 10:15 UTC, aligned to the 15 minute interval
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 10, 15, 0).unwrap();
    let selected = eligible_vendors(
        &[enabled.clone(), disabled.clone()],
        vec![
            v_active.clone(),
            v_inactive.clone(),
            v_disabled_org.clone(),
        ],
        false,
        now,
        0,
    );

    let names: Vec<&str> = selected.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["active"]);
}

#[test]
fn nothing_is_due_off_the_interval_boundary() {
    let o = org("org", true, 15);
    let v = vendor(&o, "v", true);

    let now = Utc.with_ymd_and_hms(2026, 8, 20, 10, 7, 0).unwrap();
    let selected = eligible_vendors(&[o], vec![v], false, now, 0);
    assert!(selected.is_empty());
}

#[test]
fn force_bypasses_org_gates_but_not_vendor_activity() {
    let disabled = org("disabled", false, 15);
    let v_active = vendor(&disabled, "active", true);
    let v_inactive = vendor(&disabled, "inactive", false);

    // Off-boundary minute; force ignores both the flag and the alignment
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 10, 7, 0).unwrap();
    let selected = eligible_vendors(
        &[disabled],
        vec![v_active.clone(), v_inactive],
        true,
        now,
        0,
    );

    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].id, v_active.id);
}

#[test]
fn partition_splits_new_and_known_plants() {
    let vendor_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();

    let mut existing = HashMap::new();
    existing.insert(
        "SM-1".to_string(),
        stored_plant(vendor_id, org_id, "SM-1"),
    );

    let records = vec![record("SM-1", "known"), record("SM-2", "new")];
    let (to_create, to_update) = partition_records(&existing, records);

    assert_eq!(to_create.len(), 1);
    assert_eq!(to_create[0].vendor_plant_id, "SM-2");
    assert_eq!(to_update.len(), 1);
    assert_eq!(to_update[0].vendor_plant_id, "SM-1");
}

#[test]
fn repartitioning_the_same_payload_creates_nothing() {
    let vendor_id = Uuid::new_v4();
    let org_id = Uuid::new_v4();

    let records = vec![record("SM-1", "a"), record("SM-2", "b")];
    let (to_create, _) = partition_records(&HashMap::new(), records.clone());
    assert_eq!(to_create.len(), 2);

    // After the first run every record is present, so the same payload
    // plans only updates
    let existing: HashMap<String, plants::Model> = to_create
        .iter()
        .map(|r| {
            (
                r.vendor_plant_id.clone(),
                stored_plant(vendor_id, org_id, &r.vendor_plant_id),
            )
        })
        .collect();

    let (to_create, to_update) = partition_records(&existing, records);
    assert!(to_create.is_empty());
    assert_eq!(to_update.len(), 2);
}

#[test]
fn aggregate_isolates_a_failing_vendor() {
    let results = vec![
        outcome("good", true, 10, 4, 6),
        outcome("bad", false, 0, 0, 0),
        outcome("also good", true, 3, 0, 3),
    ];

    let summary = aggregate(SyncKind::Plants, SyncTrigger::Manual, results, 42);

    assert_eq!(summary.total_vendors, 3);
    assert_eq!(summary.successful, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.synced, 13);
    assert_eq!(summary.created, 4);
    assert_eq!(summary.updated, 9);
    assert_eq!(summary.duration_ms, 42);
    assert!(!summary.skipped);
    // Plant runs carry no resolved counter
    assert!(summary.resolved.is_none());

    let errors: Vec<&VendorOutcome> =
        summary.results.iter().filter(|r| !r.success).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].vendor_name, "bad");
    assert_eq!(errors[0].error.as_deref(), Some("boom"));
}

#[test]
fn alert_aggregate_sums_resolved() {
    let mut first = outcome("a", true, 5, 5, 0);
    first.resolved = Some(2);
    let mut second = outcome("b", true, 4, 1, 3);
    second.resolved = Some(3);

    let summary = aggregate(SyncKind::Alerts, SyncTrigger::Cron, vec![first, second], 7);
    assert_eq!(summary.resolved, Some(5));
}

#[test]
fn skipped_summary_reports_the_gate() {
    let summary = SyncSummary::skipped(SyncKind::Plants, SyncTrigger::Schedule, "restricted window");

    assert!(summary.skipped);
    assert_eq!(summary.skip_reason.as_deref(), Some("restricted window"));
    assert_eq!(summary.total_vendors, 0);
    assert!(summary.results.is_empty());
}
