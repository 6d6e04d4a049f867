//! Backend timestamps.
//!
//! The backend records creation times as nanoseconds since the Unix epoch.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display format for timestamps, e.g. `19 Oct 2026, 02:30 PM`.
const DISPLAY_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// A point in time as reported by the backend (nanoseconds since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a timestamp from nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    /// Create a timestamp from a UTC datetime.
    ///
    /// Datetimes outside the representable nanosecond range saturate.
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.timestamp_nanos_opt().unwrap_or(i64::MAX))
    }

    /// The current time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// Convert to a UTC datetime.
    #[must_use]
    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format(DISPLAY_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        // 2024-03-05T14:07:00Z
        let ts = Timestamp::from_nanos(1_709_647_620_000_000_000);
        assert_eq!(ts.to_string(), "05 Mar 2024, 02:07 PM");
    }

    #[test]
    fn test_datetime_round_trip() {
        let ts = Timestamp::from_nanos(1_700_000_000_123_456_789);
        assert_eq!(Timestamp::from_datetime(ts.to_datetime()), ts);
    }

    #[test]
    fn test_ordering_is_chronological() {
        assert!(Timestamp::from_nanos(1) < Timestamp::from_nanos(2));
    }
}
