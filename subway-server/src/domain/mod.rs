//! Domain types for subway lines.
//!
//! This module contains the core model: stations, the value types carried
//! by sections, and the `Line` aggregate that keeps its sections forming a
//! single path. All types enforce their invariants at construction time,
//! so code that receives these types can trust their validity.

mod distance;
mod error;
mod line;
mod section;
mod station;
mod time;
mod time_table;

#[cfg(test)]
mod line_tests;

pub use distance::{Distance, InvalidDistance};
pub use error::LineError;
pub use line::{InvalidLineName, Line, LineId, LineName};
pub use section::Section;
pub use station::{InvalidStationName, Station, StationId, StationName};
pub use time::{TimeError, TimeOfDay, TravelTime};
pub use time_table::{InvalidTimeTable, TimeTable};
