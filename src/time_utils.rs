// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for calendar-day arithmetic.

use chrono::{Datelike, Duration, NaiveDate};

/// The rolling 7-day window ending at `end`, inclusive on both sides.
pub fn rolling_week(end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = end
        .checked_sub_signed(Duration::days(6))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}

/// First and last day of the calendar month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month_first = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    let last = next_month_first.and_then(|d| d.pred_opt()).unwrap_or(date);
    (first, last)
}

/// Iterate every day from `start` through `end`, inclusive.
///
/// Empty when `start > end`.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    #[test]
    fn test_rolling_week_spans_seven_days() {
        let (start, end) = rolling_week(d("2024-03-10"));
        assert_eq!(start, d("2024-03-04"));
        assert_eq!(end, d("2024-03-10"));
        assert_eq!(days_inclusive(start, end).count(), 7);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(d("2024-01-15")),
            (d("2024-01-01"), d("2024-01-31"))
        );
        assert_eq!(
            month_bounds(d("2024-12-31")),
            (d("2024-12-01"), d("2024-12-31"))
        );
        // Leap February
        assert_eq!(
            month_bounds(d("2024-02-10")),
            (d("2024-02-01"), d("2024-02-29"))
        );
    }

    #[test]
    fn test_days_inclusive() {
        let days: Vec<NaiveDate> = days_inclusive(d("2024-02-28"), d("2024-03-01")).collect();
        assert_eq!(days, vec![d("2024-02-28"), d("2024-02-29"), d("2024-03-01")]);

        assert_eq!(days_inclusive(d("2024-03-02"), d("2024-03-01")).count(), 0);
        let single: Vec<NaiveDate> = days_inclusive(d("2024-03-01"), d("2024-03-01")).collect();
        assert_eq!(single, vec![d("2024-03-01")]);
    }
}
