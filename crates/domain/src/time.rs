//! Time and timestamp helpers.

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

/// UTC timestamp used for `created_at`, `scheduled_at`, `executed_at`, tariff slots.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render a timestamp in the fixed-width form used for storage.
///
/// Every stored timestamp goes through this function so that string
/// comparison in SQL agrees with chronological order.
#[must_use]
pub fn to_storage(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Whether [`to_storage`] renders `ts` with a four-digit year. Outside that
/// range string order and time order disagree.
#[must_use]
pub fn is_storable(ts: Timestamp) -> bool {
    (0..=9999).contains(&ts.year())
}

/// Parse a timestamp written by [`to_storage`] (any RFC 3339 string is accepted).
///
/// # Errors
///
/// Returns a [`chrono::ParseError`] when `value` is not RFC 3339.
pub fn from_storage(value: &str) -> Result<Timestamp, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value).map(|ts| ts.to_utc())
}
