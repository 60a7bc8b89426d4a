//! Time parsing utilities for grid status payloads.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// A timestamp string that could not be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp is empty")]
    Empty,
    #[error("unparseable timestamp {0:?}")]
    Unparseable(String),
}

/// Parse an ISO-8601 timestamp as emitted by the backend.
///
/// Accepts RFC 3339 with an offset (`2025-01-15T10:30:00+00:00`, `...Z`) and
/// naive forms with or without fractional seconds, using either `T` or a
/// space as separator. Naive timestamps are taken to be UTC. A bare date is
/// read as midnight UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(TimestampError::Empty);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = s.parse::<NaiveDateTime>() {
        return Ok(Utc.from_utc_datetime(&dt));
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        && let Some(dt) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(Utc.from_utc_datetime(&dt));
    }

    Err(TimestampError::Unparseable(s.to_string()))
}

/// Format seconds as human-readable duration (e.g., "1d 02:30:00", "01:30:00", "05:30").
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 24 {
        let days = hours / 24;
        let hours = hours % 24;
        format!("{}d {:02}:{:02}:{:02}", days, hours, mins, secs)
    } else if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Format a job duration given in hours ("2h", "1.5h").
pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{}h", hours as i64)
    } else {
        format!("{:.1}h", hours)
    }
}

/// Format an hour offset relative to now, as used on the time axis.
pub fn format_offset_hours(offset: i64) -> String {
    match offset {
        0 => "Now".to_string(),
        h if h > 0 => format!("+{}h", h),
        h => format!("{}h", h),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let dt = parse_timestamp("2025-01-15T10:30:00+00:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2025-01-15 10:30");

        let dt = parse_timestamp("2025-01-15T10:30:00Z").unwrap();
        assert_eq!(dt.hour(), 10);

        // Offsets are normalized to UTC
        let dt = parse_timestamp("2025-01-15T12:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_timestamp_naive() {
        let dt = parse_timestamp("2025-01-15T10:30:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-15 10:30:00");

        // Python isoformat() with microseconds
        let dt = parse_timestamp("2025-01-15T10:30:00.123456").unwrap();
        assert_eq!(dt.nanosecond(), 123_456_000);

        let dt = parse_timestamp("2025-01-15 10:30:00").unwrap();
        assert_eq!(dt.minute(), 30);

        let dt = parse_timestamp("2025-01-15").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert_eq!(parse_timestamp(""), Err(TimestampError::Empty));
        assert_eq!(parse_timestamp("   "), Err(TimestampError::Empty));
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(TimestampError::Unparseable(_))
        ));
        assert!(parse_timestamp("2025-13-45T99:00:00").is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(330), "05:30");
        assert_eq!(format_duration(5400), "01:30:00");
        assert_eq!(format_duration(2 * 86400 + 3600), "2d 01:00:00");
    }

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(2.0), "2h");
        assert_eq!(format_hours(1.5), "1.5h");
    }

    #[test]
    fn test_format_offset_hours() {
        assert_eq!(format_offset_hours(0), "Now");
        assert_eq!(format_offset_hours(6), "+6h");
        assert_eq!(format_offset_hours(-24), "-24h");
    }
}
