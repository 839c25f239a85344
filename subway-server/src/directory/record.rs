//! Persisted shape of stations and lines.
//!
//! A line is stored as scalar fields plus a flat list of section rows.
//! There is no order column: the station order is rebuilt from the
//! sections whenever a record is turned back into a [`Line`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{
    Distance, Line, LineId, Station, StationId, StationName, TimeOfDay, TimeTable, TravelTime,
};

use super::error::DirectoryError;

/// A stored station row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: StationId,
    pub name: String,
}

impl StationRecord {
    /// Capture a station.
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id(),
            name: station.name().as_str().to_string(),
        }
    }

    /// Rebuild the station, validating its name.
    pub fn into_station(self) -> Result<Station, DirectoryError> {
        let name = StationName::new(&self.name)
            .map_err(|e| DirectoryError::snapshot(format!("station {}: {e}", self.id)))?;
        Ok(Station::new(self.id, name))
    }
}

/// A stored section row, owned by the line in `line_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub line_id: LineId,
    pub upstream_station_id: StationId,
    pub downstream_station_id: StationId,
    pub duration_secs: i64,
    pub distance_um: i64,
}

/// A stored line with its section rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: LineId,
    pub name: String,
    /// `HH:MM`
    pub start_time: String,
    /// `HH:MM`, up to `24:00`
    pub end_time: String,
    pub interval: u32,
    /// Participants in the order they joined the line.
    pub station_ids: Vec<StationId>,
    pub sections: Vec<SectionRecord>,
}

impl LineRecord {
    /// Capture a line under the given id.
    pub fn from_line(id: LineId, line: &Line) -> Result<Self, DirectoryError> {
        let sections = line
            .sections()?
            .into_iter()
            .map(|s| SectionRecord {
                line_id: id,
                upstream_station_id: s.upstream(),
                downstream_station_id: s.downstream(),
                duration_secs: s.duration().as_secs(),
                distance_um: s.distance().as_micrometres(),
            })
            .collect();

        Ok(Self {
            id,
            name: line.name().as_str().to_string(),
            start_time: line.time_table().start().to_string(),
            end_time: line.time_table().end().to_string(),
            interval: line.interval(),
            station_ids: line.stations().iter().map(Station::id).collect(),
            sections,
        })
    }

    /// Rebuild the line, resolving participants against `stations`.
    ///
    /// # Errors
    ///
    /// - `DirectoryError::StationNotFound` if a participant has no record.
    /// - `DirectoryError::Snapshot` for malformed times or foreign sections.
    /// - `DirectoryError::Line` if the sections do not form a valid path.
    pub fn into_line(
        self,
        stations: &BTreeMap<StationId, Station>,
    ) -> Result<Line, DirectoryError> {
        let id = self.id;
        let start = TimeOfDay::parse_hhmm(&self.start_time)
            .map_err(|e| DirectoryError::snapshot(format!("line {id}: {e}")))?;
        let end = TimeOfDay::parse_hhmm(&self.end_time)
            .map_err(|e| DirectoryError::snapshot(format!("line {id}: {e}")))?;
        let time_table = TimeTable::new(start, end)
            .map_err(|e| DirectoryError::snapshot(format!("line {id}: {e}")))?;

        let participants = self
            .station_ids
            .iter()
            .map(|sid| {
                stations
                    .get(sid)
                    .cloned()
                    .ok_or(DirectoryError::StationNotFound(*sid))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sections = self
            .sections
            .into_iter()
            .map(|s| {
                if s.line_id != id {
                    return Err(DirectoryError::snapshot(format!(
                        "line {id}: section belongs to line {}",
                        s.line_id
                    )));
                }
                let duration = TravelTime::from_secs(s.duration_secs)
                    .map_err(|e| DirectoryError::snapshot(format!("line {id}: {e}")))?;
                Ok((
                    s.upstream_station_id,
                    s.downstream_station_id,
                    duration,
                    Distance::from_micrometres(s.distance_um),
                ))
            })
            .collect::<Result<Vec<_>, DirectoryError>>()?;

        Ok(Line::restore(
            id,
            &self.name,
            time_table,
            self.interval,
            participants,
            sections,
        )?)
    }
}

/// Everything the directory stores, as one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Last station id handed out.
    pub last_station_id: u64,
    /// Last line id handed out.
    pub last_line_id: u64,
    pub stations: Vec<StationRecord>,
    pub lines: Vec<LineRecord>,
}
