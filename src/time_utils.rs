// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing, formatting and day/week windows.

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Years representable as a Firestore timestamp.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse an entry date: either `YYYY-MM-DD` (UTC midnight) or RFC3339.
///
/// Dates outside years 1..=9999 are rejected.
pub fn parse_entry_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    let parsed = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(day) => start_of_day(day),
        Err(_) => DateTime::parse_from_rfc3339(raw)
            .ok()?
            .with_timezone(&Utc),
    };
    YEAR_RANGE.contains(&parsed.year()).then_some(parsed)
}

/// Parse a calendar day from a path segment (`YYYY-MM-DD` or RFC3339).
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_entry_date(raw).map(|dt| dt.date_naive())
}

/// UTC midnight at the start of `day`.
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Half-open `[start, end)` window covering a single day.
///
/// `None` if the window leaves chrono's date range.
pub fn day_bounds(day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start_of_day(day);
    Some((start, start.checked_add_signed(Duration::days(1))?))
}

/// Monday that starts the ISO week containing `day`.
pub fn week_start(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_signed(Duration::days(
        day.weekday().num_days_from_monday() as i64,
    ))
}

/// Half-open `[start, end)` window covering the Monday-start week of `day`.
pub fn week_bounds(day: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = start_of_day(week_start(day)?);
    Some((start, start.checked_add_signed(Duration::days(7))?))
}

/// Period key for daily challenges: `YYYY-MM-DD`.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Period key for weekly challenges: ISO week `YYYY-Www`.
pub fn week_key(day: NaiveDate) -> String {
    let week = day.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_entry_date_plain_day() {
        let parsed = parse_entry_date("2024-03-05").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_entry_date_rfc3339_with_offset() {
        let parsed = parse_entry_date("2024-03-05T10:30:00-08:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 5, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_entry_date_rejects_garbage() {
        assert!(parse_entry_date("yesterday").is_none());
        assert!(parse_entry_date("2024-13-40").is_none());
    }

    #[test]
    fn test_parse_entry_date_rejects_out_of_range_years() {
        assert!(parse_entry_date("+262142-12-31").is_none());
        assert!(parse_entry_date("-262143-01-01").is_none());
        assert!(parse_entry_date("0000-06-01").is_none());
        assert!(parse_entry_date("10000-01-01").is_none());
        assert!(parse_entry_date("9999-12-31").is_some());
        assert!(parse_entry_date("0001-01-01").is_some());
    }

    #[test]
    fn test_day_window_at_chrono_limit_is_none() {
        assert!(day_bounds(NaiveDate::MAX).is_none());
        assert!(day_bounds(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()).is_some());
    }

    #[test]
    fn test_week_bounds_start_on_monday() {
        // 2024-03-07 is a Thursday
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let (start, end) = week_bounds(day).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());

        // A Monday is its own week start
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(week_start(monday), Some(monday));
    }

    #[test]
    fn test_period_keys() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(day_key(day), "2024-12-30");
        // ISO week 1 of 2025 starts on 2024-12-30
        assert_eq!(week_key(day), "2025-W01");
    }

    #[test]
    fn test_format_utc_rfc3339() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(format_utc_rfc3339(dt), "2024-01-15T10:00:00Z");
    }
}
