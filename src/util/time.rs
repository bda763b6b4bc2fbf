use chrono::{DateTime, SecondsFormat, Utc};

/// Current wall-clock time as an ISO-8601 string, e.g. `2024-01-01T00:00:00.000Z`
pub fn now_iso8601() -> String {
    format_iso8601(Utc::now())
}

pub fn format_iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an ISO-8601 timestamp into milliseconds since the epoch.
/// Returns `None` for anything that isn't a valid RFC 3339 date.
pub fn parse_iso8601_millis(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|at| at.timestamp_millis())
}
