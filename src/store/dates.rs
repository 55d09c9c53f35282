//! Date and timestamp encodings used by storage records.
//!
//! Dates are written as `yyyy-MM-dd`, timestamps as RFC 3339 in UTC. Reading
//! is lenient: a value that cannot be understood reads as absent.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Accepts a bare date or anything that starts with one (`2024-06-01T00:00:00Z`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// RFC 3339, a naive date-time (taken as UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_date("2024-06-01"), expected);
        assert_eq!(parse_date("2024-06-01T10:00:00Z"), expected);
        assert_eq!(parse_date("June 1st"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-06-01T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T08:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-06-01"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_timestamp_round_trip_keeps_nanos() {
        let ts = Utc.timestamp_opt(1_717_230_000, 123_456_789).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(ts)), Some(ts));
    }
}
