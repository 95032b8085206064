//! Unit tests for clocks and date helpers

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::temporal::{compact, parse_date, short_or_dash};
use core_kernel::{Clock, FixedClock, SystemClock, TemporalError, Timezone};

#[test]
fn test_timezone_parse() {
    assert!(Timezone::parse("America/New_York").is_ok());
    assert_eq!(
        Timezone::parse("Mars/Olympus"),
        Err(TemporalError::InvalidTimezone("Mars/Olympus".to_string()))
    );
}

#[test]
fn test_local_date_crosses_midnight() {
    // 02:00 UTC is still the previous evening in New York
    let instant = Utc.with_ymd_and_hms(2025, 6, 2, 2, 0, 0).unwrap();
    let tz = Timezone::parse("America/New_York").unwrap();
    assert_eq!(tz.local_date(instant), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    assert_eq!(Timezone::utc().local_date(instant), NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
}

#[test]
fn test_timezone_serde() {
    let tz = Timezone::parse("Europe/London").unwrap();
    let json = serde_json::to_string(&tz).unwrap();
    assert_eq!(json, "\"Europe/London\"");
    let back: Timezone = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tz);
}

#[test]
fn test_fixed_clock_at_instant() {
    let instant = Utc.with_ymd_and_hms(2025, 1, 15, 8, 30, 0).unwrap();
    let clock = FixedClock::at(instant);
    assert_eq!(clock.now(), instant);
    assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
}

#[test]
fn test_system_clock_today_is_plausible() {
    let clock = SystemClock::default();
    let today = clock.today();
    assert_eq!(today, Utc::now().date_naive());
}

#[test]
fn test_parse_date_trims_whitespace() {
    assert_eq!(
        parse_date(" 2025-03-09 ").unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    );
    assert!(matches!(parse_date("31/02/2025"), Err(TemporalError::InvalidDate(_))));
}

#[test]
fn test_compact_and_short_formats() {
    let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
    assert_eq!(compact(date), "20250309");
    assert_eq!(short_or_dash(Some(date)), "03/09/25");
    assert_eq!(short_or_dash(None), "-");
}
