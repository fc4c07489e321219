//! Epoch-millisecond time helpers.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};

pub const SECOND_MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Seconds from config to milliseconds.
pub fn secs_to_ms(secs: u64) -> i64 {
    (secs as i64).saturating_mul(SECOND_MS)
}

pub fn to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

/// RFC 3339 / ISO 8601 rendering with millisecond precision.
pub fn to_rfc3339(ms: i64) -> String {
    to_datetime(ms).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Hour bucket key, e.g. `2026-03-01T14`.
pub fn hour_bucket(ms: i64) -> String {
    to_datetime(ms).format("%Y-%m-%dT%H").to_string()
}

/// Hour of day (0–23, UTC).
pub fn hour_of_day(ms: i64) -> u32 {
    to_datetime(ms).hour()
}
