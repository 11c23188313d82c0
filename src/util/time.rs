//! Timestamp parsing for values read back from storage.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Parse an RFC 3339 timestamp, tolerating the bare `%Y-%m-%d %H:%M:%S`
/// form older rows may carry. Falls back to now rather than failing a
/// whole row scan on one bad timestamp.
#[must_use]
pub fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive);
    }

    Utc::now()
}
