//! Unit tests for the vendor normalization helpers.
//!
//! Run with: cargo test --test norm_test

use chrono::{TimeZone, Utc};
use helio_sync::vendor::norm::{
    capacity_to_kw, coerce_timestamp, energy_to_kwh, merge_address, numeric, power_to_kw,
};
use serde_json::json;

#[test]
fn epoch_seconds_parse_as_utc() {
    let ts = coerce_timestamp(&json!(1_755_648_000)).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2025, 8, 20, 0, 0, 0).unwrap());
}

#[test]
fn fractional_epoch_seconds_keep_their_millis() {
    let ts = coerce_timestamp(&json!(1_755_648_000.25)).unwrap();
    assert_eq!(ts.timestamp(), 1_755_648_000);
    assert_eq!(ts.timestamp_subsec_millis(), 250);
}

#[test]
fn large_epochs_are_read_as_milliseconds() {
    let ts = coerce_timestamp(&json!(1_755_648_000_123_i64)).unwrap();
    assert_eq!(ts.timestamp(), 1_755_648_000);
    assert_eq!(ts.timestamp_subsec_millis(), 123);
}

#[test]
fn numeric_string_epochs_parse_too() {
    let ts = coerce_timestamp(&json!("1755648000")).unwrap();
    assert_eq!(ts.timestamp(), 1_755_648_000);
}

#[test]
fn rfc3339_strings_convert_to_utc() {
    let ts = coerce_timestamp(&json!("2026-08-20T14:05:00Z")).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2026, 8, 20, 14, 5, 0).unwrap());

    let offset = coerce_timestamp(&json!("2026-08-20T19:35:00+05:30")).unwrap();
    assert_eq!(offset, Utc.with_ymd_and_hms(2026, 8, 20, 14, 5, 0).unwrap());
}

#[test]
fn naive_strings_are_interpreted_as_utc() {
    let ts = coerce_timestamp(&json!("2026-08-20 14:05:00")).unwrap();
    assert_eq!(ts, Utc.with_ymd_and_hms(2026, 8, 20, 14, 5, 0).unwrap());
}

#[test]
fn implausible_timestamps_are_rejected() {
    // Bare year labels and small counters must not be read as epochs.
    assert!(coerce_timestamp(&json!("2026")).is_none());
    assert!(coerce_timestamp(&json!(2026)).is_none());
    assert!(coerce_timestamp(&json!(12_345)).is_none());
    assert!(coerce_timestamp(&json!("")).is_none());
    assert!(coerce_timestamp(&json!("   ")).is_none());
    assert!(coerce_timestamp(&json!("yesterday")).is_none());
    assert!(coerce_timestamp(&json!(null)).is_none());
    assert!(coerce_timestamp(&json!(true)).is_none());
}

#[test]
fn numeric_accepts_numbers_and_numeric_strings() {
    assert_eq!(numeric(&json!(42.5)), Some(42.5));
    assert_eq!(numeric(&json!("42.5")), Some(42.5));
    assert_eq!(numeric(&json!(" 7 ")), Some(7.0));
    assert_eq!(numeric(&json!("abc")), None);
    assert_eq!(numeric(&json!(null)), None);
    assert_eq!(numeric(&json!([1])), None);
}

#[test]
fn power_converts_by_unit() {
    assert_eq!(power_to_kw(&json!(2500), Some("W")), Some(2.5));
    assert_eq!(power_to_kw(&json!("1.5"), Some("MW")), Some(1500.0));
    assert_eq!(power_to_kw(&json!(2), Some("GW")), Some(2_000_000.0));
    // No unit, or an explicit kW, means the value is already kW.
    assert_eq!(power_to_kw(&json!(3.2), None), Some(3.2));
    assert_eq!(power_to_kw(&json!(3.2), Some("kW")), Some(3.2));
    assert_eq!(power_to_kw(&json!("n/a"), Some("W")), None);
}

#[test]
fn energy_converts_by_unit() {
    assert_eq!(energy_to_kwh(&json!(4100), Some("Wh")), Some(4.1));
    assert_eq!(energy_to_kwh(&json!("2.41"), Some("MWh")), Some(2410.0));
    assert_eq!(energy_to_kwh(&json!(8.8), Some("GWh")), Some(8_800_000.0));
    assert_eq!(energy_to_kwh(&json!(410.2), None), Some(410.2));
    assert_eq!(energy_to_kwh(&json!(410.2), Some("kWh")), Some(410.2));
}

#[test]
fn capacity_accepts_peak_suffixes() {
    assert_eq!(capacity_to_kw(&json!(950_000), Some("Wp")), Some(950.0));
    assert_eq!(capacity_to_kw(&json!("1.2"), Some("MWp")), Some(1200.0));
    assert_eq!(capacity_to_kw(&json!("120.5"), Some("kWp")), Some(120.5));
    assert_eq!(capacity_to_kw(&json!("120.5"), None), Some(120.5));
    assert_eq!(capacity_to_kw(&json!(2), Some("GW")), Some(2_000_000.0));
}

#[test]
fn address_parts_join_with_commas() {
    assert_eq!(
        merge_address(&[Some("12 Solar Park Rd"), Some("Pune"), Some("Maharashtra")]),
        Some("12 Solar Park Rd, Pune, Maharashtra".to_string())
    );
}

#[test]
fn empty_address_parts_are_skipped() {
    assert_eq!(
        merge_address(&[Some("  "), Some("Pune"), None, Some("")]),
        Some("Pune".to_string())
    );
    assert_eq!(merge_address(&[None, Some(" "), Some("")]), None);
    assert_eq!(merge_address(&[]), None);
}
