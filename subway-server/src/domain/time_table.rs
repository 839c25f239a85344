//! Operating hours of a line.

use std::fmt;

use super::TimeOfDay;

/// Error returned when a timetable's bounds are inverted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid timetable: start {start} is after end {end}")]
pub struct InvalidTimeTable {
    start: TimeOfDay,
    end: TimeOfDay,
}

/// First and last service times of a line.
///
/// Independent of the section graph. Guarantees `start <= end`.
///
/// # Examples
///
/// ```
/// use subway_server::domain::{TimeOfDay, TimeTable};
///
/// let all_day = TimeTable::all_day();
/// assert_eq!(all_day.to_string(), "00:00-24:00");
///
/// let late = TimeOfDay::parse_hhmm("23:00").unwrap();
/// let early = TimeOfDay::parse_hhmm("05:00").unwrap();
/// assert!(TimeTable::new(late, early).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeTable {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeTable {
    /// Create a timetable, rejecting `start > end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, InvalidTimeTable> {
        if start > end {
            return Err(InvalidTimeTable { start, end });
        }
        Ok(Self { start, end })
    }

    /// A timetable covering the whole day, `00:00` to `24:00`.
    pub fn all_day() -> Self {
        Self {
            start: TimeOfDay::START_OF_DAY,
            end: TimeOfDay::END_OF_DAY,
        }
    }

    /// Returns the first service time.
    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    /// Returns the last service time.
    pub fn end(&self) -> TimeOfDay {
        self.end
    }
}

impl fmt::Display for TimeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
