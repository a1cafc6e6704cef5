//! Pure date arithmetic for the leave ledger: day counting, overlap checks
//! and per-year splitting. Day counts are calendar-inclusive; weekends and
//! holidays are not excluded.

use chrono::{Datelike, NaiveDate};

/// Calendar-inclusive day count; a same-day range counts as one day.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Overlap check with both endpoints inclusive on both ranges.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Days of `[start, end]` that fall inside calendar `year`.
pub fn days_in_year(start: NaiveDate, end: NaiveDate, year: i32) -> i64 {
    let Some(year_start) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return 0;
    };
    let Some(year_end) = NaiveDate::from_ymd_opt(year, 12, 31) else {
        return 0;
    };
    let from = start.max(year_start);
    let to = end.min(year_end);
    if from > to { 0 } else { inclusive_days(from, to) }
}

/// Splits an application's day count per calendar year, ascending. An
/// application straddling a year boundary debits each year separately.
pub fn split_by_year(start: NaiveDate, end: NaiveDate) -> Vec<(i32, i64)> {
    (start.year()..=end.year())
        .map(|year| (year, days_in_year(start, end, year)))
        .filter(|(_, days)| *days > 0)
        .collect()
}

/// Whole days of notice between `today` and the requested start.
/// Negative when the start date is already in the past.
pub fn notice_days(today: NaiveDate, start: NaiveDate) -> i64 {
    (start - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_counts_as_one() {
        assert_eq!(inclusive_days(date(2026, 3, 1), date(2026, 3, 1)), 1);
    }

    #[test]
    fn inclusive_day_count() {
        assert_eq!(inclusive_days(date(2026, 3, 1), date(2026, 3, 5)), 5);
    }

    #[test]
    fn overlap_is_endpoint_inclusive() {
        // Sharing a single day counts as overlap.
        assert!(ranges_overlap(
            date(2026, 3, 1),
            date(2026, 3, 5),
            date(2026, 3, 5),
            date(2026, 3, 9)
        ));
        assert!(!ranges_overlap(
            date(2026, 3, 1),
            date(2026, 3, 5),
            date(2026, 3, 6),
            date(2026, 3, 9)
        ));
    }

    #[test]
    fn split_within_one_year() {
        assert_eq!(
            split_by_year(date(2026, 3, 1), date(2026, 3, 5)),
            vec![(2026, 5)]
        );
    }

    #[test]
    fn split_across_year_boundary() {
        assert_eq!(
            split_by_year(date(2026, 12, 28), date(2027, 1, 3)),
            vec![(2026, 4), (2027, 3)]
        );
    }

    #[test]
    fn days_in_year_clips_to_year_bounds() {
        assert_eq!(days_in_year(date(2026, 12, 28), date(2027, 1, 3), 2026), 4);
        assert_eq!(days_in_year(date(2026, 12, 28), date(2027, 1, 3), 2027), 3);
        assert_eq!(days_in_year(date(2026, 12, 28), date(2027, 1, 3), 2028), 0);
    }

    #[test]
    fn notice_days_can_be_negative() {
        assert_eq!(notice_days(date(2026, 3, 10), date(2026, 3, 12)), 2);
        assert_eq!(notice_days(date(2026, 3, 10), date(2026, 3, 8)), -2);
    }
}
