//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Line, LineError, Section, Station};

/// Request to register a station.
#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    /// Station name, unique across the directory
    pub name: String,
}

/// A station in responses.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: u64,
    pub name: String,
}

impl StationResult {
    /// Convert a domain station to a response row.
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id().get(),
            name: station.name().to_string(),
        }
    }
}

/// Response listing stations.
#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub stations: Vec<StationResult>,
}

/// Request to create a line.
#[derive(Debug, Deserialize)]
pub struct CreateLineRequest {
    /// Line name, unique across the directory
    pub name: String,

    /// First service, `HH:MM`
    pub start_time: String,

    /// Last service, `HH:MM` (up to `24:00`)
    pub end_time: String,

    /// Minutes between departures
    pub interval: u32,
}

/// Request to register a station on a line.
#[derive(Debug, Deserialize)]
pub struct AddStationRequest {
    pub station_id: u64,
}

/// Request to add a section to a line.
#[derive(Debug, Deserialize)]
pub struct AddSectionRequest {
    pub upstream_id: u64,
    pub downstream_id: u64,

    /// Travel time in seconds
    pub duration_secs: Option<i64>,

    /// Travel time as `HH:MM` or `HH:MM:SS`, instead of `duration_secs`
    pub duration: Option<String>,

    /// Section length in kilometres
    pub distance_km: f64,
}

/// A section in responses.
#[derive(Debug, Serialize)]
pub struct SectionResult {
    pub upstream_id: u64,
    pub downstream_id: u64,
    pub duration_secs: i64,

    /// Travel time as `HH:MM:SS`
    pub duration: String,

    pub distance_km: f64,
}

impl SectionResult {
    /// Convert a domain section to a response row.
    pub fn from_section(section: &Section) -> Self {
        Self {
            upstream_id: section.upstream().get(),
            downstream_id: section.downstream().get(),
            duration_secs: section.duration().as_secs(),
            duration: section.duration().to_string(),
            distance_km: section.distance().as_km(),
        }
    }
}

/// A line with its derived station order.
#[derive(Debug, Serialize)]
pub struct LineResult {
    pub id: Option<u64>,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub interval: u32,

    /// First station of the path, absent without sections
    pub start_station: Option<StationResult>,

    /// Last station of the path, absent without sections
    pub end_station: Option<StationResult>,

    /// Stations from the start of the path to its end
    pub stations: Vec<StationResult>,

    /// Every participating station, linked or not, in joining order
    pub participants: Vec<StationResult>,

    /// Sections in path order
    pub sections: Vec<SectionResult>,
}

impl LineResult {
    /// Convert a line, deriving its station order.
    pub fn from_line(line: &Line) -> Result<Self, LineError> {
        Ok(Self {
            id: line.id().map(|id| id.get()),
            name: line.name().to_string(),
            start_time: line.time_table().start().to_string(),
            end_time: line.time_table().end().to_string(),
            interval: line.interval(),
            start_station: line
                .start_station()?
                .as_ref()
                .map(StationResult::from_station),
            end_station: line
                .end_station()?
                .as_ref()
                .map(StationResult::from_station),
            stations: line
                .ordered_stations()?
                .iter()
                .map(StationResult::from_station)
                .collect(),
            participants: line
                .stations()
                .iter()
                .map(StationResult::from_station)
                .collect(),
            sections: line
                .sections()?
                .iter()
                .map(SectionResult::from_section)
                .collect(),
        })
    }
}

/// Response listing lines.
#[derive(Debug, Serialize)]
pub struct LineListResponse {
    pub lines: Vec<LineResult>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
