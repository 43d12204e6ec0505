// SPDX-License-Identifier: MIT

//! ISO week identifiers.
//!
//! Weeks are identified as `YYYY-Www` (e.g. `2026-W35`), where the year is
//! the ISO week-year, not the calendar year. All arithmetic goes through
//! chrono's week-date support so 53-week years and year rollovers are
//! handled correctly.

use chrono::{Datelike, Duration, NaiveDate, Utc};

/// Week identifier for an arbitrary date, e.g. `2026-W35`.
pub fn week_id_for_date(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// Week identifier for the current wall-clock date.
pub fn current_week_id() -> String {
    week_id_for_date(Utc::now().date_naive())
}

/// The current week id and the `n - 1` preceding week ids, newest first.
pub fn recent_week_ids(n: usize) -> Vec<String> {
    let today = Utc::now().date_naive();
    (0..n)
        .map(|i| week_id_for_date(today - Duration::weeks(i as i64)))
        .collect()
}

/// Syntactic check for a `YYYY-Www` identifier.
pub fn is_week_id(s: &str) -> bool {
    if !s.is_ascii() || s.len() != 8 {
        return false;
    }
    let (year, rest) = s.split_at(4);
    year.chars().all(|c| c.is_ascii_digit())
        && rest.as_bytes()[0] == b'-'
        && rest.as_bytes()[1] == b'W'
        && rest[2..].chars().all(|c| c.is_ascii_digit())
        && matches!(rest[2..].parse::<u32>(), Ok(1..=53))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_week_id_format() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap();
        assert_eq!(week_id_for_date(date), "2024-W51");
    }

    #[test]
    fn test_year_rollover() {
        // 2024-12-30 is a Monday, already in ISO week 1 of 2025
        let date = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        assert_eq!(week_id_for_date(date), "2025-W01");

        // 2021-01-01 is a Friday, still in ISO week 53 of 2020
        let date = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        assert_eq!(week_id_for_date(date), "2020-W53");
    }

    #[test]
    fn test_53_week_year() {
        // 2020 has 53 ISO weeks; the week before 2020-W01 is 2019-W52
        let date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        assert_eq!(week_id_for_date(date), "2020-W53");

        let prev = date - Duration::weeks(1);
        assert_eq!(week_id_for_date(prev), "2020-W52");
    }

    #[test]
    fn test_recent_week_ids_are_consecutive_and_distinct() {
        let weeks = recent_week_ids(6);
        assert_eq!(weeks.len(), 6);
        assert_eq!(weeks[0], current_week_id());
        for pair in weeks.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_is_week_id() {
        assert!(is_week_id("2025-W51"));
        assert!(is_week_id("2020-W53"));
        assert!(is_week_id("2026-W01"));
        assert!(!is_week_id("2025-W00"));
        assert!(!is_week_id("2025-W54"));
        assert!(!is_week_id("2025W51"));
        assert!(!is_week_id("25-W51"));
        assert!(!is_week_id("2025-w51"));
        assert!(!is_week_id("ab\u{20ac}\u{20ac}"));
        assert!(!is_week_id(""));
    }
}
