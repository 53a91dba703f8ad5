//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines `Timestamp`, the instant type used for `opened_at`,
//! `completed_at` and `actual_delivered_at`. Always UTC, truncated to
//! seconds so stored records compare equal after a JSON round-trip.
//!
//! Accounting periods are derived from the UTC calendar date of a
//! timestamp (see [`crate::period`]), so a delivery stamped
//! `2025-03-31T23:30:00-03:00` books to `04/2025`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WoError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`]: current UTC time. Engine code should prefer
///   [`crate::Clock::now`] so tests can pin the instant.
/// - [`Timestamp::from_utc()`]: from a `DateTime<Utc>`.
/// - [`Timestamp::from_date()`]: midnight UTC of a calendar date.
/// - [`Timestamp::parse()`]: RFC 3339 (any offset) or a bare `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Midnight UTC at the start of `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
    }

    /// Convenience for tests and fixtures: midnight UTC of `year-month-day`.
    ///
    /// # Errors
    ///
    /// Returns [`WoError::InvalidTimestamp`] for an impossible calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, WoError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self::from_date)
            .ok_or_else(|| {
                WoError::InvalidTimestamp(format!("no such date {year:04}-{month:02}-{day:02}"))
            })
    }

    /// Parse an RFC 3339 timestamp (any offset, converted to UTC) or a bare
    /// `YYYY-MM-DD` date (midnight UTC).
    pub fn parse(s: &str) -> Result<Self, WoError> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| WoError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// The UTC calendar date of this instant.
    pub fn date(&self) -> NaiveDate {
        self.0.date_naive()
    }

    /// Calendar month (1-12), UTC.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Calendar year, UTC.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Render as ISO8601 with Z suffix (e.g., `2025-02-20T00:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn test_from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2025, 2, 20, 9, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2025-02-20T09:30:45Z");
    }

    #[test]
    fn test_from_ymd_is_midnight_utc() {
        let ts = Timestamp::from_ymd(2025, 3, 7).unwrap();
        assert_eq!(ts.to_iso8601(), "2025-03-07T00:00:00Z");
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.year(), 2025);
    }

    #[test]
    fn test_from_ymd_rejects_impossible_date() {
        assert!(Timestamp::from_ymd(2025, 2, 30).is_err());
        assert!(Timestamp::from_ymd(2025, 13, 1).is_err());
    }

    #[test]
    fn test_parse_bare_date() {
        let ts = Timestamp::parse("2025-11-01").unwrap();
        assert_eq!(ts, Timestamp::from_ymd(2025, 11, 1).unwrap());
    }

    #[test]
    fn test_parse_offset_converted_to_utc() {
        let ts = Timestamp::parse("2025-03-31T23:30:00-03:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2025-04-01T02:30:00Z");
        assert_eq!(ts.month(), 4);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
        assert!(Timestamp::parse("2025/03/07").is_err());
    }

    #[test]
    fn test_ordering() {
        let earlier = Timestamp::parse("2025-01-15T12:00:00Z").unwrap();
        let later = Timestamp::parse("2025-01-15T12:00:01Z").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_serde_roundtrip() {
        let ts = Timestamp::parse("2025-02-20T08:15:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
