//! Timestamp parsing for fact records.
//!
//! ETL exports mix ISO-8601, SQL-style and day-first Brazilian formats, and some
//! sources emit epoch milliseconds. Naive values are interpreted as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 86_400;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parses a timestamp, returning `None` when no supported format matches.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() >= 10 && s.chars().all(|c| c.is_ascii_digit()) {
        let millis: i64 = s.parse().ok()?;
        return Utc.timestamp_millis_opt(millis).single();
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

/// Parses the calendar date part of a timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2024-03-10T12:30:00-03:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_sql_datetime() {
        let ts = parse_timestamp("2024-03-10 08:15:42").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 10, 8, 15, 42).unwrap());

        let ts = parse_timestamp("2024-03-10 08:15:42.250").unwrap();
        assert_eq!(ts.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_without_seconds() {
        let ts = parse_timestamp("2024-03-10T08:15").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 10, 8, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_day_first() {
        let ts = parse_timestamp("05/02/2024").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap());

        let ts = parse_timestamp("05/02/2024 17:45").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 2, 5, 17, 45, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let ts = parse_timestamp("2024-12-31").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_epoch_millis() {
        let ts = parse_timestamp("1704067200000").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-06-15T23:59:59Z"),
            NaiveDate::from_ymd_opt(2024, 6, 15)
        );
    }
}
