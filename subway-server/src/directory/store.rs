//! Shared store of stations and lines.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::{
    Distance, Line, LineError, LineId, Station, StationId, StationName, TimeTable, TravelTime,
};

use super::error::DirectoryError;
use super::record::{DirectorySnapshot, LineRecord, StationRecord};
use super::snapshot::SnapshotStore;

#[derive(Debug, Default)]
struct Inner {
    last_station_id: u64,
    last_line_id: u64,
    stations: BTreeMap<StationId, Station>,
    lines: BTreeMap<LineId, Line>,
}

impl Inner {
    fn from_snapshot(snapshot: DirectorySnapshot) -> Result<Self, DirectoryError> {
        let mut inner = Inner {
            last_station_id: snapshot.last_station_id,
            last_line_id: snapshot.last_line_id,
            ..Inner::default()
        };

        for record in snapshot.stations {
            let station = record.into_station()?;
            inner.last_station_id = inner.last_station_id.max(station.id().get());
            inner.stations.insert(station.id(), station);
        }

        for record in snapshot.lines {
            let id = record.id;
            let line = record.into_line(&inner.stations)?;
            inner.last_line_id = inner.last_line_id.max(id.get());
            inner.lines.insert(id, line);
        }

        Ok(inner)
    }

    fn to_snapshot(&self) -> Result<DirectorySnapshot, DirectoryError> {
        Ok(DirectorySnapshot {
            last_station_id: self.last_station_id,
            last_line_id: self.last_line_id,
            stations: self
                .stations
                .values()
                .map(StationRecord::from_station)
                .collect(),
            lines: self
                .lines
                .iter()
                .map(|(id, line)| LineRecord::from_line(*id, line))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Thread-safe directory of stations and lines.
///
/// Cloning is cheap and every clone shares the same data. Each change
/// runs under the write lock against a copy of the stored line; the copy
/// replaces the stored one only if the change and the snapshot write both
/// succeed, so callers never observe a half-applied change.
#[derive(Clone)]
pub struct LineDirectory {
    inner: Arc<RwLock<Inner>>,
    store: Option<SnapshotStore>,
}

impl LineDirectory {
    /// Create an empty directory that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            store: None,
        }
    }

    /// Open a directory backed by a snapshot file.
    ///
    /// Starts empty if the file does not exist. Every stored line is
    /// validated while loading.
    pub fn open(store: SnapshotStore) -> Result<Self, DirectoryError> {
        let inner = match store.load()? {
            Some(snapshot) => Inner::from_snapshot(snapshot)?,
            None => Inner::default(),
        };
        info!(
            path = %store.path().display(),
            stations = inner.stations.len(),
            lines = inner.lines.len(),
            "opened line directory"
        );

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            store: Some(store),
        })
    }

    /// Register a new station with a unique name.
    pub async fn create_station(&self, name: &str) -> Result<Station, DirectoryError> {
        let name = StationName::new(name).map_err(|e| DirectoryError::InvalidName(e.to_string()))?;

        let mut guard = self.inner.write().await;
        if guard.stations.values().any(|s| s.name() == &name) {
            return Err(DirectoryError::DuplicateName(name.to_string()));
        }

        let id = StationId::new(guard.last_station_id + 1);
        let station = Station::new(id, name);
        guard.last_station_id = id.get();
        guard.stations.insert(id, station.clone());

        if let Err(e) = self.persist(&guard) {
            guard.stations.remove(&id);
            return Err(e);
        }
        info!(station = %id, name = %station.name(), "created station");
        Ok(station)
    }

    /// Look up a station record.
    pub async fn station(&self, id: StationId) -> Result<Station, DirectoryError> {
        let guard = self.inner.read().await;
        guard
            .stations
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::StationNotFound(id))
    }

    /// All station records, ordered by id.
    pub async fn stations(&self) -> Vec<Station> {
        let guard = self.inner.read().await;
        guard.stations.values().cloned().collect()
    }

    /// Create a line with a unique name.
    pub async fn create_line(
        &self,
        name: &str,
        time_table: TimeTable,
        interval: u32,
    ) -> Result<Line, DirectoryError> {
        let mut line = Line::create(name, time_table, interval)?;

        let mut guard = self.inner.write().await;
        if guard.lines.values().any(|l| l.name() == line.name()) {
            return Err(DirectoryError::DuplicateName(line.name().to_string()));
        }

        let id = LineId::new(guard.last_line_id + 1);
        line.assign_id(id);
        guard.last_line_id = id.get();
        guard.lines.insert(id, line.clone());

        if let Err(e) = self.persist(&guard) {
            guard.lines.remove(&id);
            return Err(e);
        }
        info!(line = %id, name = %line.name(), "created line");
        Ok(line)
    }

    /// Look up a line.
    pub async fn line(&self, id: LineId) -> Result<Line, DirectoryError> {
        let guard = self.inner.read().await;
        guard
            .lines
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::LineNotFound(id))
    }

    /// All lines, ordered by id.
    pub async fn lines(&self) -> Vec<Line> {
        let guard = self.inner.read().await;
        guard.lines.values().cloned().collect()
    }

    /// Delete a line together with its sections.
    ///
    /// Station records are kept.
    pub async fn delete_line(&self, id: LineId) -> Result<(), DirectoryError> {
        let mut guard = self.inner.write().await;
        let line = guard
            .lines
            .get_mut(&id)
            .ok_or(DirectoryError::LineNotFound(id))?;
        let original = line.clone();
        line.clear_stations();
        guard.lines.remove(&id);

        if let Err(e) = self.persist(&guard) {
            guard.lines.insert(id, original);
            return Err(e);
        }
        info!(
            line = %id,
            name = %original.name(),
            sections = original.section_count(),
            "deleted line"
        );
        Ok(())
    }

    /// Register an existing station as a participant of a line.
    pub async fn add_station_to_line(
        &self,
        line_id: LineId,
        station_id: StationId,
    ) -> Result<Line, DirectoryError> {
        let station = self.station(station_id).await?;
        self.modify(line_id, |line| line.add_station(station)).await
    }

    /// Add a section to a line, splicing or extending its path as needed.
    pub async fn add_section(
        &self,
        line_id: LineId,
        upstream: StationId,
        downstream: StationId,
        duration: TravelTime,
        distance: Distance,
    ) -> Result<Line, DirectoryError> {
        self.modify(line_id, |line| {
            line.add_section(upstream, downstream, duration, distance)
        })
        .await
    }

    /// Remove a station from a line, merging the sections around it.
    pub async fn remove_station(
        &self,
        line_id: LineId,
        station_id: StationId,
    ) -> Result<Line, DirectoryError> {
        self.modify(line_id, |line| line.delete_station(station_id))
            .await
    }

    /// Apply `change` to a copy of the line and store it on success.
    async fn modify<F>(&self, id: LineId, change: F) -> Result<Line, DirectoryError>
    where
        F: FnOnce(&mut Line) -> Result<(), LineError>,
    {
        let mut guard = self.inner.write().await;
        let mut line = guard
            .lines
            .get(&id)
            .cloned()
            .ok_or(DirectoryError::LineNotFound(id))?;

        if let Err(e) = change(&mut line) {
            debug!(line = %id, error = %e, "line rejected change");
            return Err(e.into());
        }

        let previous = guard.lines.insert(id, line.clone());
        if let Err(e) = self.persist(&guard) {
            if let Some(previous) = previous {
                guard.lines.insert(id, previous);
            }
            return Err(e);
        }
        debug!(line = %id, sections = line.section_count(), "saved line");
        Ok(line)
    }

    fn persist(&self, inner: &Inner) -> Result<(), DirectoryError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let result = inner.to_snapshot().and_then(|snapshot| store.save(&snapshot));
        if let Err(e) = &result {
            warn!(path = %store.path().display(), error = %e, "failed to save directory snapshot");
        }
        result
    }
}
