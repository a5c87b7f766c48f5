//! Calendar-date helpers.
//!
//! Dates travel as `YYYY-MM-DD`. Timestamps that start with a calendar date
//! (`2024-03-01T00:00:00Z`, `2024-03-01 10:00`) are truncated to that date.

use chrono::NaiveDate;

use crate::error::{InvoiceError, InvoiceResult};

const YMD: &str = "%Y-%m-%d";

/// Normalize a date or timestamp string to a calendar date.
pub fn parse_ymd(input: &str) -> InvoiceResult<NaiveDate> {
    let s = input.trim();
    let head = match s.get(..10) {
        Some(head) if s.len() == 10 => head,
        Some(head) if matches!(s.as_bytes().get(10), Some(b'T' | b't' | b' ')) => head,
        _ => return Err(invalid(s)),
    };
    NaiveDate::parse_from_str(head, YMD).map_err(|_| invalid(s))
}

pub fn format_ymd(date: NaiveDate) -> String {
    date.format(YMD).to_string()
}

fn invalid(s: &str) -> InvoiceError {
    InvoiceError::invalid_literal(format!("'{s}' is not a YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn accepts_plain_dates_and_timestamps() {
        assert_eq!(parse_ymd("2024-03-01").unwrap(), d(2024, 3, 1));
        assert_eq!(parse_ymd(" 2024-03-01 ").unwrap(), d(2024, 3, 1));
        assert_eq!(parse_ymd("2024-03-01T10:20:30Z").unwrap(), d(2024, 3, 1));
        assert_eq!(parse_ymd("2024-03-01 10:20").unwrap(), d(2024, 3, 1));
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in ["", "2024-3-1", "01/03/2024", "2024-02-30", "2024-03-01x", "tomorrow"] {
            let err = parse_ymd(bad).unwrap_err();
            assert_eq!(err.code(), "INVALID_LITERAL", "input {bad:?}");
        }
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!(format_ymd(d(2024, 1, 5)), "2024-01-05");
    }
}
