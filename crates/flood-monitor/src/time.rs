//! UTC timestamp helpers shared by the feed and subscription wire formats.

use chrono::{DateTime, Utc};

/// Convert an epoch-milliseconds value to a UTC datetime at second
/// precision. Sub-second components are truncated (floor division), never
/// rounded.
#[must_use]
pub fn datetime_from_epoch_ms(ms: i64) -> DateTime<Utc> {
    // chrono rejects timestamps outside roughly ±262000 years; clamp
    // rather than panic.
    DateTime::from_timestamp(ms.div_euclid(1000), 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Render a datetime in the wire format both APIs exchange:
/// `YYYY-MM-DDTHH:MM:SSZ`, always the literal `Z` suffix, never an offset.
/// UTC is enforced by the signature.
#[must_use]
pub fn format_timestamp(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
