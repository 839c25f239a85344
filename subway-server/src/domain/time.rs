//! Time value types for lines and sections.
//!
//! Two kinds of time appear on a line: how long a train takes to cover a
//! section ([`TravelTime`]), and the clock times bounding a line's
//! operating hours ([`TimeOfDay`]). Both parse from colon-separated
//! strings and use exact integer arithmetic.

use chrono::Duration;
use std::fmt;

/// Error returned when a time value is malformed or out of range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Elapsed travel time along a section.
///
/// Whole-second resolution, never negative. Sums and differences are
/// exact, so splitting a section and merging it back yields the original
/// value.
///
/// # Examples
///
/// ```
/// use subway_server::domain::TravelTime;
///
/// let t = TravelTime::parse("01:01").unwrap();
/// assert_eq!(t.as_secs(), 3660);
/// assert_eq!(t.to_string(), "01:01:00");
///
/// let half = TravelTime::from_secs(1830).unwrap();
/// assert_eq!(t.checked_sub(half), Some(half));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TravelTime(Duration);

impl TravelTime {
    /// Build from a number of seconds. Negative values are rejected.
    pub fn from_secs(secs: i64) -> Result<Self, TimeError> {
        if secs < 0 {
            return Err(TimeError::new("travel time cannot be negative"));
        }
        Duration::try_seconds(secs)
            .map(Self)
            .ok_or_else(|| TimeError::new("travel time out of range"))
    }

    /// Build from a number of minutes. Negative values are rejected.
    pub fn from_minutes(mins: i64) -> Result<Self, TimeError> {
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| TimeError::new("travel time out of range"))?;
        Self::from_secs(secs)
    }

    /// Parse `HH:MM` or `HH:MM:SS`.
    ///
    /// Hours may exceed 23; minutes and seconds must be below 60.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split(':');
        let hours = parts
            .next()
            .and_then(parse_digits)
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minutes = parts
            .next()
            .and_then(parse_two_digits)
            .ok_or_else(|| TimeError::new("expected HH:MM or HH:MM:SS"))?;
        let seconds = match parts.next() {
            Some(p) => parse_two_digits(p).ok_or_else(|| TimeError::new("invalid second digits"))?,
            None => 0,
        };
        if parts.next().is_some() {
            return Err(TimeError::new("expected HH:MM or HH:MM:SS"));
        }
        if minutes > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if seconds > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Self::from_secs(hours * 3600 + minutes * 60 + seconds)
    }

    /// Returns the total number of seconds.
    pub fn as_secs(&self) -> i64 {
        self.0.num_seconds()
    }

    /// Sum of two travel times, `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(&other.0).map(Self)
    }

    /// Difference of two travel times, `None` if the result would be negative.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let diff = self.0.checked_sub(&other.0)?;
        if diff < Duration::zero() {
            return None;
        }
        Some(Self(diff))
    }
}

impl fmt::Debug for TravelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TravelTime({self})")
    }
}

impl fmt::Display for TravelTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.as_secs();
        write!(
            f,
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

/// Minutes in a day; `24:00` is the last representable clock time.
const MINUTES_PER_DAY: u16 = 24 * 60;

/// A clock time between `00:00` and `24:00` inclusive, minute resolution.
///
/// `24:00` is allowed so that a timetable can cover a full service day.
///
/// # Examples
///
/// ```
/// use subway_server::domain::TimeOfDay;
///
/// let open = TimeOfDay::parse_hhmm("05:30").unwrap();
/// let close = TimeOfDay::parse_hhmm("24:00").unwrap();
/// assert!(open < close);
/// assert_eq!(close.to_string(), "24:00");
///
/// assert!(TimeOfDay::parse_hhmm("24:01").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Midnight at the start of the day.
    pub const START_OF_DAY: TimeOfDay = TimeOfDay(0);

    /// Midnight at the end of the day.
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from minutes since midnight (`0..=1440`).
    pub fn from_minutes(minutes: u16) -> Result<Self, TimeError> {
        if minutes > MINUTES_PER_DAY {
            return Err(TimeError::new("time of day must be within 00:00-24:00"));
        }
        Ok(Self(minutes))
    }

    /// Parse from `HH:MM` format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }
        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour = std::str::from_utf8(&bytes[0..2])
            .ok()
            .and_then(parse_two_digits)
            .ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = std::str::from_utf8(&bytes[3..5])
            .ok()
            .and_then(parse_two_digits)
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        let total = u16::try_from(hour * 60 + minute)
            .map_err(|_| TimeError::new("time of day must be within 00:00-24:00"))?;
        Self::from_minutes(total)
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Parse exactly two ASCII digits.
fn parse_two_digits(s: &str) -> Option<i64> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}

/// Parse one or more ASCII digits (no sign).
fn parse_digits(s: &str) -> Option<i64> {
    if s.is_empty() || s.len() > 9 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
