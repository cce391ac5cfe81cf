//! Lenient timestamp parsing and rolling-window helpers.
//!
//! Activity history arrives with timestamps recorded by several generations of
//! clients: RFC 3339 with an offset, naive ISO datetimes, sometimes a bare
//! date. Parsing is best-effort; anything unparseable is excluded from window
//! calculations rather than surfaced as an error.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parses a timestamp string, treating naive values as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Some(Utc.from_utc_datetime(&midnight));
    }
    None
}

/// The UTC calendar day a timestamp falls on, if it parses.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

/// The start of a rolling window `days` back from `now`.
pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

/// The start of a rolling window `hours` back from `now`.
pub fn hours_ago(now: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    now - Duration::hours(hours)
}

/// Whether a raw timestamp parses and falls inside the trailing `days` window.
pub fn within_days(raw: &str, now: DateTime<Utc>, days: i64) -> bool {
    parse_timestamp(raw).is_some_and(|ts| ts >= days_ago(now, days))
}

/// Whether a raw timestamp parses and falls inside the trailing `hours` window.
pub fn within_hours(raw: &str, now: DateTime<Utc>, hours: i64) -> bool {
    parse_timestamp(raw).is_some_and(|ts| ts >= hours_ago(now, hours))
}
