//! Unit tests for alert status derivation, severity mapping, the device
//! filter and the lookback window.
//!
//! Run with: cargo test --test alert_sync_test

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use helio_sync::entity::alerts::{AlertSeverity, AlertStatus};
use helio_sync::sync::alerts::{
    derive_status, grid_down_seconds, is_inverter_alert, lookback_window, next_status,
    DEFAULT_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS,
};
use helio_sync::vendor::solarman::map_severity;
use helio_sync::vendor::AlertRecord;

fn alert(device_type: Option<&str>) -> AlertRecord {
    AlertRecord {
        vendor_alert_id: "A-1".to_string(),
        vendor_plant_id: "SM-1".to_string(),
        name: "Grid fault".to_string(),
        device_type: device_type.map(str::to_string),
        device_sn: Some("SN001".to_string()),
        severity: AlertSeverity::High,
        alert_time: Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap(),
        end_time: None,
    }
}

#[test]
fn severity_mapping_table() {
    // level 2 with generation influence is the worst case
    assert_eq!(map_severity(Some(2), Some(1)), AlertSeverity::Critical);
    assert_eq!(map_severity(Some(2), Some(0)), AlertSeverity::High);
    assert_eq!(map_severity(Some(2), None), AlertSeverity::High);
    assert_eq!(map_severity(Some(1), Some(1)), AlertSeverity::High);
    assert_eq!(map_severity(Some(1), Some(0)), AlertSeverity::Medium);
    assert_eq!(map_severity(Some(1), None), AlertSeverity::Medium);
    assert_eq!(map_severity(Some(0), Some(1)), AlertSeverity::Low);
    assert_eq!(map_severity(None, None), AlertSeverity::Low);
    // Unknown levels degrade to LOW rather than guessing upward
    assert_eq!(map_severity(Some(7), Some(1)), AlertSeverity::Low);
}

#[test]
fn new_alert_status_follows_end_time() {
    let end = Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap();
    assert_eq!(derive_status(None), AlertStatus::Active);
    assert_eq!(derive_status(Some(end)), AlertStatus::Resolved);
}

#[test]
fn active_resolves_when_end_time_appears() {
    let end = Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap();
    assert_eq!(
        next_status(AlertStatus::Active, Some(end)),
        AlertStatus::Resolved
    );
    assert_eq!(next_status(AlertStatus::Active, None), AlertStatus::Active);
}

#[test]
fn resolved_never_reopens() {
    // A vendor retransmitting without the end time must not reopen the alert
    assert_eq!(
        next_status(AlertStatus::Resolved, None),
        AlertStatus::Resolved
    );
}

#[test]
fn acknowledged_is_never_overwritten() {
    let end = Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap();
    assert_eq!(
        next_status(AlertStatus::Acknowledged, Some(end)),
        AlertStatus::Acknowledged
    );
    assert_eq!(
        next_status(AlertStatus::Acknowledged, None),
        AlertStatus::Acknowledged
    );
}

#[test]
fn grid_down_is_the_outage_span() {
    let start = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2026, 8, 20, 11, 30, 0).unwrap();

    assert_eq!(grid_down_seconds(start, Some(end)), Some(2 * 3600 + 1800));
    assert_eq!(grid_down_seconds(start, None), None);
}

#[test]
fn grid_down_clamps_clock_skew_to_zero() {
    let start = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
    let before_start = start - Duration::seconds(90);

    assert_eq!(grid_down_seconds(start, Some(before_start)), Some(0));
}

#[test]
fn device_filter_keeps_only_inverters() {
    assert!(is_inverter_alert(&alert(Some("INVERTER"))));
    assert!(is_inverter_alert(&alert(Some("inverter"))));
    assert!(is_inverter_alert(&alert(Some("Inverter"))));

    assert!(!is_inverter_alert(&alert(Some("COLLECTOR"))));
    assert!(!is_inverter_alert(&alert(Some("METER"))));
    assert!(!is_inverter_alert(&alert(None)));
}

#[test]
fn lookback_defaults_to_thirty_days() {
    let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
    let window = lookback_window(now, None);

    assert_eq!(window.end, now);
    assert_eq!(window.start, now - Duration::days(DEFAULT_LOOKBACK_DAYS));
}

#[test]
fn configured_start_is_used_when_recent() {
    let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
    let start_date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    let window = lookback_window(now, Some(start_date));

    assert_eq!(
        window.start,
        Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(window.end, now);
}

#[test]
fn configured_start_is_capped_at_one_year() {
    let now = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
    let ancient = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let window = lookback_window(now, Some(ancient));

    assert_eq!(window.start, now - Duration::days(MAX_LOOKBACK_DAYS));
    assert_eq!(window.end, now);
}
