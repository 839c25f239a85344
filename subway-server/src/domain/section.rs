//! Directed section between two stations.

use super::{Distance, StationId, TravelTime};

/// A directed, weighted edge of a line: trains run from `upstream` to
/// `downstream`, taking `duration` over `distance`.
///
/// Sections belong to exactly one line and are created only by that line's
/// mutation operations, or when a persisted line is restored.
///
/// # Invariants
///
/// - `upstream != downstream`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Section {
    upstream: StationId,
    downstream: StationId,
    duration: TravelTime,
    distance: Distance,
}

impl Section {
    /// Callers guarantee `upstream != downstream`.
    pub(crate) fn new(
        upstream: StationId,
        downstream: StationId,
        duration: TravelTime,
        distance: Distance,
    ) -> Self {
        debug_assert_ne!(upstream, downstream);
        Self {
            upstream,
            downstream,
            duration,
            distance,
        }
    }

    /// Returns the station trains depart from.
    pub fn upstream(&self) -> StationId {
        self.upstream
    }

    /// Returns the station trains arrive at.
    pub fn downstream(&self) -> StationId {
        self.downstream
    }

    /// Returns the travel time along this section.
    pub fn duration(&self) -> TravelTime {
        self.duration
    }

    /// Returns the length of this section.
    pub fn distance(&self) -> Distance {
        self.distance
    }
}
