//! Calendar-day helpers. Days are stored as "YYYY-MM-DD" strings and compared
//! lexicographically, so everything here formats with that exact layout.

use chrono::{Datelike, Local, Months, NaiveDate};

use crate::error::{LedgerError, Result};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}

pub fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| LedgerError::validation(format!("invalid date '{s}', expected YYYY-MM-DD")))
}

/// "YYYY-MM" of `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// January 1st and December 31st of the year containing `date`.
pub fn year_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    let last = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
    (first, last)
}

/// Shift by whole calendar months, clamping to the end of shorter months.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(d("2024-02-14")), (d("2024-02-01"), d("2024-02-29")));
        assert_eq!(month_bounds(d("2023-12-31")), (d("2023-12-01"), d("2023-12-31")));
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(year_bounds(d("2024-06-15")), (d("2024-01-01"), d("2024-12-31")));
    }

    #[test]
    fn test_add_months_clamps() {
        assert_eq!(add_months(d("2024-01-31"), 1), d("2024-02-29"));
        assert_eq!(add_months(d("2024-05-31"), -3), d("2024-02-29"));
        assert_eq!(add_months(d("2024-05-10"), 0), d("2024-05-10"));
    }

    #[test]
    fn test_parse_day_rejects_other_layouts() {
        assert!(parse_day("2024/01/02").is_err());
        assert!(parse_day("02-01-2024").is_err());
        assert_eq!(format_day(d(" 2024-01-02 ")), "2024-01-02");
    }

    #[test]
    fn test_month_key() {
        assert_eq!(month_key(d("2024-03-09")), "2024-03");
    }
}
