//! Timestamp formatting for stored documents.
//!
//! Timestamps are RFC 3339 UTC strings with millisecond precision and a `Z`
//! suffix. At that fixed width lexicographic order equals chronological
//! order, which is what "latest by `createdAt`" queries rely on.

use chrono::{DateTime, SecondsFormat, Utc};
use mockable::Clock;

/// Format an instant for storage.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use dealroom::domain::format_timestamp;
///
/// let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
/// assert_eq!(format_timestamp(at), "2024-05-01T09:30:00.000Z");
/// ```
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current instant from `clock`, formatted for storage.
pub fn now_timestamp(clock: &dyn Clock) -> String {
    format_timestamp(clock.utc())
}
