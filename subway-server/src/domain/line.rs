//! Line aggregate.
//!
//! A `Line` owns its sections and keeps them forming a single simple
//! directed path. The station order is never stored: it is recomputed from
//! the sections on every read by walking outgoing sections from the one
//! station that has no incoming section.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Distance, LineError, Section, Station, StationId, TimeTable, TravelTime};

/// Identifier of a line, assigned by the line directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u64);

impl LineId {
    /// Wrap a raw identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a line name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line name: {reason}")]
pub struct InvalidLineName {
    reason: &'static str,
}

/// A validated, trimmed, non-empty line name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineName(String);

impl LineName {
    /// Validate and wrap a line name.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidLineName> {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidLineName {
                reason: "name cannot be empty",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineName({})", self.0)
    }
}

impl fmt::Display for LineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A transit line: participating stations plus the sections linking them.
///
/// # Invariants
///
/// - Every station has at most one outgoing and one incoming section.
/// - The sections form one connected path without cycles, so exactly one
///   station starts it and one ends it whenever sections exist.
/// - Every station referenced by a section is a participant.
///
/// Mutating operations check everything before their first write, so an
/// `Err` always leaves the line exactly as it was.
///
/// # Examples
///
/// ```
/// use subway_server::domain::{Distance, Line, Station, StationId, StationName, TimeTable, TravelTime};
///
/// let mut line = Line::create("2호선", TimeTable::all_day(), 6).unwrap();
/// let a = Station::new(StationId::new(1), StationName::new("A").unwrap());
/// let b = Station::new(StationId::new(2), StationName::new("B").unwrap());
/// line.add_station(a.clone()).unwrap();
/// line.add_station(b.clone()).unwrap();
///
/// line.add_section(
///     a.id(),
///     b.id(),
///     TravelTime::from_minutes(10).unwrap(),
///     Distance::from_km(1.5).unwrap(),
/// )
/// .unwrap();
///
/// assert_eq!(line.ordered_stations().unwrap(), vec![a.clone(), b]);
/// assert_eq!(line.start_station().unwrap(), Some(a));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: Option<LineId>,
    name: LineName,
    time_table: TimeTable,
    /// Minutes between departures.
    interval: u32,
    /// Participants in the order they joined.
    stations: Vec<Station>,
    /// Sections keyed by their upstream station.
    by_upstream: HashMap<StationId, Section>,
    /// Downstream station to the upstream key of its incoming section.
    by_downstream: HashMap<StationId, StationId>,
}

impl Line {
    /// Create a line with no stations.
    ///
    /// # Errors
    ///
    /// `LineError::InvalidLine` if the name is blank or `interval` is zero.
    pub fn create(
        name: impl AsRef<str>,
        time_table: TimeTable,
        interval: u32,
    ) -> Result<Self, LineError> {
        let name =
            LineName::new(name).map_err(|_| LineError::InvalidLine("name cannot be empty"))?;
        if interval == 0 {
            return Err(LineError::InvalidLine("interval must be positive"));
        }

        Ok(Self {
            id: None,
            name,
            time_table,
            interval,
            stations: Vec::new(),
            by_upstream: HashMap::new(),
            by_downstream: HashMap::new(),
        })
    }

    /// Rebuild a line from persisted parts.
    ///
    /// Sections are taken as stored, without splicing. Anything that breaks
    /// the line invariants is reported as `LineError::InvalidGraphState`.
    pub fn restore(
        id: LineId,
        name: impl AsRef<str>,
        time_table: TimeTable,
        interval: u32,
        stations: Vec<Station>,
        sections: impl IntoIterator<Item = (StationId, StationId, TravelTime, Distance)>,
    ) -> Result<Self, LineError> {
        let mut line = Self::create(name, time_table, interval)?;
        line.id = Some(id);

        for station in stations {
            line.add_station(station)?;
        }

        for (upstream, downstream, duration, distance) in sections {
            if upstream == downstream {
                return Err(LineError::InvalidGraphState(
                    "section starts and ends at the same station",
                ));
            }
            if !line.contains_station(upstream) || !line.contains_station(downstream) {
                return Err(LineError::InvalidGraphState(
                    "section references a station not on the line",
                ));
            }
            if !distance.is_positive() {
                return Err(LineError::InvalidGraphState("section distance is not positive"));
            }
            if line.by_upstream.contains_key(&upstream)
                || line.by_downstream.contains_key(&downstream)
            {
                return Err(LineError::InvalidGraphState(
                    "station has two sections in the same direction",
                ));
            }
            line.insert_section(Section::new(upstream, downstream, duration, distance));
        }

        line.path()?;
        Ok(line)
    }

    /// Returns the line id, once the directory has assigned one.
    pub fn id(&self) -> Option<LineId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: LineId) {
        self.id = Some(id);
    }

    /// Returns the line name.
    pub fn name(&self) -> &LineName {
        &self.name
    }

    /// Returns the operating hours.
    pub fn time_table(&self) -> TimeTable {
        self.time_table
    }

    /// Returns the minutes between departures.
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Returns the participating stations in the order they were added.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Returns the participant with the given id.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.id() == id)
    }

    /// Returns true if the station participates in this line.
    pub fn contains_station(&self, id: StationId) -> bool {
        self.station(id).is_some()
    }

    /// Returns the number of sections.
    pub fn section_count(&self) -> usize {
        self.by_upstream.len()
    }

    /// Returns the section leaving `station`, if any.
    pub fn section_from(&self, station: StationId) -> Option<&Section> {
        self.by_upstream.get(&station)
    }

    /// Returns the section arriving at `station`, if any.
    pub fn section_into(&self, station: StationId) -> Option<&Section> {
        self.by_downstream
            .get(&station)
            .and_then(|upstream| self.by_upstream.get(upstream))
    }

    /// Add a station to the participant set without linking it.
    ///
    /// # Errors
    ///
    /// `LineError::DuplicateStation` if a station with the same id is
    /// already a participant.
    pub fn add_station(&mut self, station: Station) -> Result<(), LineError> {
        if self.contains_station(station.id()) {
            return Err(LineError::DuplicateStation(station.id()));
        }
        self.stations.push(station);
        Ok(())
    }

    /// Link `upstream` to `downstream`.
    ///
    /// Depending on where the two stations sit, the new section starts a
    /// path, extends it at either end, or is spliced into an existing
    /// section:
    ///
    /// - If `upstream` already has a section `upstream -> X`, that section
    ///   becomes `upstream -> downstream` plus `downstream -> X` carrying the
    ///   remaining time and distance.
    /// - If `downstream` already has a section `Y -> downstream`, that
    ///   section becomes `Y -> upstream` carrying the remainder plus
    ///   `upstream -> downstream`.
    ///
    /// # Errors
    ///
    /// - `LineError::StationNotFound` if either station is not a participant.
    /// - `LineError::InvalidSection` if the stations are equal, the distance
    ///   is not positive, a spliced section is not strictly shorter in both
    ///   time and distance than the one it splits, or the result would branch,
    ///   merge, loop, or leave two separate paths.
    pub fn add_section(
        &mut self,
        upstream: StationId,
        downstream: StationId,
        duration: TravelTime,
        distance: Distance,
    ) -> Result<(), LineError> {
        if upstream == downstream {
            return Err(LineError::InvalidSection(
                "upstream and downstream stations must differ",
            ));
        }
        for id in [upstream, downstream] {
            if !self.contains_station(id) {
                return Err(LineError::StationNotFound(id));
            }
        }
        if !distance.is_positive() {
            return Err(LineError::InvalidSection("distance must be positive"));
        }
        if self
            .section_from(upstream)
            .is_some_and(|s| s.downstream() == downstream)
        {
            return Err(LineError::InvalidSection("section already exists"));
        }

        let new = Section::new(upstream, downstream, duration, distance);
        let outgoing = self.section_from(upstream).copied();
        let incoming = self.section_into(downstream).copied();

        match (outgoing, incoming) {
            (Some(_), Some(_)) => Err(LineError::InvalidSection(
                "both stations are already linked in this direction",
            )),
            (Some(existing), None) => {
                if self.is_linked(downstream) {
                    return Err(LineError::InvalidSection(
                        "downstream station is already on the path",
                    ));
                }
                let (rest_duration, rest_distance) = remainder(&existing, duration, distance)?;
                let rest = Section::new(
                    downstream,
                    existing.downstream(),
                    rest_duration,
                    rest_distance,
                );

                self.remove_section(&existing);
                self.insert_section(new);
                self.insert_section(rest);
                debug!(%upstream, %downstream, next = %existing.downstream(), "spliced section after upstream");
                Ok(())
            }
            (None, Some(existing)) => {
                if self.is_linked(upstream) {
                    return Err(LineError::InvalidSection(
                        "upstream station is already on the path",
                    ));
                }
                let (rest_duration, rest_distance) = remainder(&existing, duration, distance)?;
                let rest = Section::new(existing.upstream(), upstream, rest_duration, rest_distance);

                self.remove_section(&existing);
                self.insert_section(rest);
                self.insert_section(new);
                debug!(%upstream, %downstream, previous = %existing.upstream(), "spliced section before downstream");
                Ok(())
            }
            (None, None) => {
                let starts_path = self.by_upstream.is_empty()
                    && !self.is_linked(upstream)
                    && !self.is_linked(downstream);
                let extends_end =
                    self.by_downstream.contains_key(&upstream) && !self.is_linked(downstream);
                let extends_start =
                    self.by_upstream.contains_key(&downstream) && !self.is_linked(upstream);

                if !(starts_path || extends_end || extends_start) {
                    return Err(LineError::InvalidSection(
                        "section must start the path or extend one of its ends",
                    ));
                }

                self.insert_section(new);
                debug!(%upstream, %downstream, starts_path, extends_end, extends_start, "appended section");
                Ok(())
            }
        }
    }

    /// Remove a station from the line, repairing the path around it.
    ///
    /// A station between `X` and `Y` is replaced by a single section
    /// `X -> Y` whose time and distance are the sums of the two removed
    /// sections. An end station just loses its one section.
    ///
    /// # Errors
    ///
    /// `LineError::StationNotFound` if the station is not a participant.
    pub fn delete_station(&mut self, station: StationId) -> Result<(), LineError> {
        if !self.contains_station(station) {
            return Err(LineError::StationNotFound(station));
        }

        let incoming = self.section_into(station).copied();
        let outgoing = self.section_from(station).copied();

        match (incoming, outgoing) {
            (Some(before), Some(after)) => {
                let duration = before
                    .duration()
                    .checked_add(after.duration())
                    .ok_or(LineError::InvalidSection("merged travel time overflows"))?;
                let distance = before
                    .distance()
                    .checked_add(after.distance())
                    .ok_or(LineError::InvalidSection("merged distance overflows"))?;

                self.remove_section(&before);
                self.remove_section(&after);
                self.insert_section(Section::new(
                    before.upstream(),
                    after.downstream(),
                    duration,
                    distance,
                ));
                debug!(%station, from = %before.upstream(), to = %after.downstream(), "merged sections around removed station");
            }
            (Some(only), None) | (None, Some(only)) => {
                self.remove_section(&only);
                debug!(%station, "removed end section");
            }
            (None, None) => {}
        }

        self.stations.retain(|s| s.id() != station);
        Ok(())
    }

    /// Returns the stations from path start to path end.
    ///
    /// Empty when the line has no sections.
    ///
    /// # Errors
    ///
    /// `LineError::InvalidGraphState` if the sections do not form a single
    /// path. Unreachable while the line is only changed through its own
    /// operations.
    pub fn ordered_stations(&self) -> Result<Vec<Station>, LineError> {
        self.path()?
            .into_iter()
            .map(|id| {
                self.station(id).cloned().ok_or(LineError::InvalidGraphState(
                    "section references a station not on the line",
                ))
            })
            .collect()
    }

    /// Returns the first station of the path, `None` without sections.
    pub fn start_station(&self) -> Result<Option<Station>, LineError> {
        Ok(self.ordered_stations()?.into_iter().next())
    }

    /// Returns the last station of the path, `None` without sections.
    pub fn end_station(&self) -> Result<Option<Station>, LineError> {
        Ok(self.ordered_stations()?.pop())
    }

    /// Returns the sections in path order.
    pub fn sections(&self) -> Result<Vec<Section>, LineError> {
        let path = self.path()?;
        Ok(path
            .iter()
            .filter_map(|id| self.by_upstream.get(id).copied())
            .collect())
    }

    /// Remove every section and every participant.
    pub fn clear_stations(&mut self) {
        self.by_upstream.clear();
        self.by_downstream.clear();
        self.stations.clear();
    }

    /// Returns true if the station has any section.
    fn is_linked(&self, station: StationId) -> bool {
        self.by_upstream.contains_key(&station) || self.by_downstream.contains_key(&station)
    }

    fn insert_section(&mut self, section: Section) {
        self.by_upstream.insert(section.upstream(), section);
        self.by_downstream
            .insert(section.downstream(), section.upstream());
    }

    fn remove_section(&mut self, section: &Section) {
        self.by_upstream.remove(&section.upstream());
        self.by_downstream.remove(&section.downstream());
    }

    /// Walk the path from its unique start, returning station ids in order.
    fn path(&self) -> Result<Vec<StationId>, LineError> {
        if self.by_upstream.is_empty() {
            return Ok(Vec::new());
        }

        let mut starts = self
            .by_upstream
            .keys()
            .filter(|id| !self.by_downstream.contains_key(id));
        let start = *starts
            .next()
            .ok_or(LineError::InvalidGraphState("no station starts the path"))?;
        if starts.next().is_some() {
            return Err(LineError::InvalidGraphState(
                "more than one station starts a path",
            ));
        }

        let mut path = Vec::with_capacity(self.by_upstream.len() + 1);
        let mut seen = HashSet::with_capacity(self.by_upstream.len() + 1);
        let mut current = start;
        loop {
            if !seen.insert(current) {
                return Err(LineError::InvalidGraphState("cycle detected"));
            }
            path.push(current);
            match self.by_upstream.get(&current) {
                Some(section) => current = section.downstream(),
                None => break,
            }
        }

        if path.len() != self.by_upstream.len() + 1 {
            return Err(LineError::InvalidGraphState(
                "sections do not form a single path",
            ));
        }
        Ok(path)
    }
}

/// Time and distance left over when `existing` is split by a new section.
fn remainder(
    existing: &Section,
    duration: TravelTime,
    distance: Distance,
) -> Result<(TravelTime, Distance), LineError> {
    if duration >= existing.duration() {
        return Err(LineError::InvalidSection(
            "travel time must be shorter than the section being split",
        ));
    }
    if distance >= existing.distance() {
        return Err(LineError::InvalidSection(
            "distance must be shorter than the section being split",
        ));
    }

    let rest_duration = existing
        .duration()
        .checked_sub(duration)
        .ok_or(LineError::InvalidSection("travel time underflow"))?;
    let rest_distance = existing
        .distance()
        .checked_sub(distance)
        .ok_or(LineError::InvalidSection("distance underflow"))?;
    Ok((rest_duration, rest_distance))
}
