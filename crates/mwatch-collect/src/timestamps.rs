//! Source timestamp encodings.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// ISO-8601 / RFC 3339, e.g. `2026-03-01T12:00:00Z` or with fractional seconds.
pub(crate) fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Unix epoch seconds, possibly fractional (Reddit's `created_utc`).
pub(crate) fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let millis = (secs * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis).single()
}

/// GDELT's compact `YYYYMMDDTHHMMSSZ`, also accepted without the `T`/`Z`.
pub(crate) fn parse_compact(raw: &str) -> Option<DateTime<Utc>> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 14 {
        return None;
    }
    NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a timestamp in GDELT's query format.
pub(crate) fn format_compact(at: DateTime<Utc>) -> String {
    at.format("%Y%m%d%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_variants() {
        let a = parse_rfc3339("2026-03-01T12:00:00Z").unwrap();
        let b = parse_rfc3339("2026-03-01T13:00:00.000+01:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_rfc3339("yesterday").is_none());
    }

    #[test]
    fn epoch_seconds() {
        let at = from_epoch_secs(1_772_366_400.0).unwrap();
        assert_eq!(at, parse_rfc3339("2026-03-01T12:00:00Z").unwrap());
        assert!(from_epoch_secs(f64::NAN).is_none());
    }

    #[test]
    fn compact_with_and_without_separators() {
        let expected = parse_rfc3339("2026-03-01T12:34:56Z").unwrap();
        assert_eq!(parse_compact("20260301T123456Z"), Some(expected));
        assert_eq!(parse_compact("20260301123456"), Some(expected));
        assert!(parse_compact("2026030112").is_none());
        assert!(parse_compact("20261301123456").is_none());
    }

    #[test]
    fn compact_round_trip_format() {
        let at = parse_rfc3339("2026-03-01T12:34:56Z").unwrap();
        assert_eq!(format_compact(at), "20260301123456");
    }
}
