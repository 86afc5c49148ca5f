//! Unit tests for the scheduling gates.
//!
//! Run with: cargo test --test sync_window_test

use chrono::{TimeZone, Utc};

use helio_sync::sync::window::{
    in_restricted_window, local_minute_of_day, org_interval_due, RestrictedWindow,
    DEFAULT_INTERVAL_MINUTES,
};

const IST_OFFSET_MINUTES: i32 = 330;

#[test]
fn window_parses_hhmm_pairs() {
    let window = RestrictedWindow::parse("19:00-06:00").unwrap();
    assert!(window.contains(19 * 60));
    assert!(!window.contains(6 * 60));

    assert_eq!(
        RestrictedWindow::parse("09:00-17:00"),
        RestrictedWindow::parse(" 09:00 - 17:00 "),
    );
}

#[test]
fn window_parse_rejects_garbage() {
    assert!(RestrictedWindow::parse("").is_none());
    assert!(RestrictedWindow::parse("   ").is_none());
    assert!(RestrictedWindow::parse("19:00").is_none());
    assert!(RestrictedWindow::parse("25:00-06:00").is_none());
    assert!(RestrictedWindow::parse("19:60-06:00").is_none());
    assert!(RestrictedWindow::parse("banana").is_none());
}

#[test]
fn wrapping_window_covers_late_night() {
    let window = RestrictedWindow::parse("19:00-06:00").unwrap();

    // 23:30 is inside the wrap
    assert!(window.contains(23 * 60 + 30));
    // 02:00 past midnight is still inside
    assert!(window.contains(2 * 60));
    // Start is inclusive, end is exclusive
    assert!(window.contains(19 * 60));
    assert!(!window.contains(6 * 60));
    // Midday is outside
    assert!(!window.contains(10 * 60));
    assert!(!window.contains(18 * 60 + 59));
}

#[test]
fn non_wrapping_window_is_a_plain_range() {
    let window = RestrictedWindow::parse("09:00-17:00").unwrap();
    assert!(window.contains(9 * 60));
    assert!(window.contains(12 * 60));
    assert!(!window.contains(17 * 60));
    assert!(!window.contains(8 * 60 + 59));
    assert!(!window.contains(23 * 60));
}

#[test]
fn zero_length_window_restricts_nothing() {
    let window = RestrictedWindow::parse("12:00-12:00").unwrap();
    for minute in [0, 12 * 60, 23 * 60 + 59] {
        assert!(!window.contains(minute));
    }
}

#[test]
fn local_minute_applies_the_fixed_offset() {
    // 00:00 UTC is 05:30 IST
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 0, 0, 0).unwrap();
    assert_eq!(local_minute_of_day(now, IST_OFFSET_MINUTES), 330);

    // 20:00 UTC is 01:30 IST the next day
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 20, 0, 0).unwrap();
    assert_eq!(local_minute_of_day(now, IST_OFFSET_MINUTES), 90);

    // Zero offset is UTC wall clock
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 14, 45, 0).unwrap();
    assert_eq!(local_minute_of_day(now, 0), 14 * 60 + 45);
}

#[test]
fn restricted_window_check_uses_local_time() {
    let window = RestrictedWindow::parse("19:00-06:00").unwrap();

    // 15:00 UTC = 20:30 IST, inside the window
    let evening = Utc.with_ymd_and_hms(2026, 8, 20, 15, 0, 0).unwrap();
    assert!(in_restricted_window(
        evening,
        IST_OFFSET_MINUTES,
        Some(&window)
    ));

    // 06:00 UTC = 11:30 IST, outside
    let midday = Utc.with_ymd_and_hms(2026, 8, 20, 6, 0, 0).unwrap();
    assert!(!in_restricted_window(
        midday,
        IST_OFFSET_MINUTES,
        Some(&window)
    ));

    // No window configured never restricts
    assert!(!in_restricted_window(evening, IST_OFFSET_MINUTES, None));
}

#[test]
fn interval_15_is_due_on_quarter_hours() {
    for minute in [0, 15, 30, 45] {
        let now = Utc.with_ymd_and_hms(2026, 8, 20, 10, minute, 0).unwrap();
        assert!(org_interval_due(now, 0, 15), "minute {minute} should be due");
    }
    for minute in [1, 7, 14, 16, 29, 44, 59] {
        let now = Utc.with_ymd_and_hms(2026, 8, 20, 10, minute, 0).unwrap();
        assert!(
            !org_interval_due(now, 0, 15),
            "minute {minute} should not be due"
        );
    }
}

#[test]
fn interval_alignment_follows_the_local_clock() {
    // 12:45 UTC = 18:15 IST, aligned to 15
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 12, 45, 0).unwrap();
    assert!(org_interval_due(now, IST_OFFSET_MINUTES, 15));

    // 12:48 UTC = 18:18 IST, not aligned
    let now = Utc.with_ymd_and_hms(2026, 8, 20, 12, 48, 0).unwrap();
    assert!(!org_interval_due(now, IST_OFFSET_MINUTES, 15));
}

#[test]
fn hourly_interval_is_due_once_an_hour() {
    let on_the_hour = Utc.with_ymd_and_hms(2026, 8, 20, 9, 0, 0).unwrap();
    assert!(org_interval_due(on_the_hour, 0, 60));

    let quarter_past = Utc.with_ymd_and_hms(2026, 8, 20, 9, 15, 0).unwrap();
    assert!(!org_interval_due(quarter_past, 0, 60));
}

#[test]
fn invalid_interval_falls_back_to_default() {
    assert_eq!(DEFAULT_INTERVAL_MINUTES, 15);

    // :30 is on the default boundary, :20 is not
    let aligned = Utc.with_ymd_and_hms(2026, 8, 20, 10, 30, 0).unwrap();
    let unaligned = Utc.with_ymd_and_hms(2026, 8, 20, 10, 20, 0).unwrap();

    for bad_interval in [0, -5] {
        assert!(org_interval_due(aligned, 0, bad_interval));
        assert!(!org_interval_due(unaligned, 0, bad_interval));
    }
}
