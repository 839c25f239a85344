//! Domain error types.
//!
//! These errors represent validation failures detected by the line
//! aggregate. They are distinct from directory and HTTP errors, and every
//! one of them is returned before any state changes.

use super::StationId;

/// Errors raised by [`Line`](super::Line) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// The station is already a participant of the line
    #[error("station {0} is already on this line")]
    DuplicateStation(StationId),

    /// The station is not a participant of the line
    #[error("station {0} is not on this line")]
    StationNotFound(StationId),

    /// The section would break the path, or its values are unusable
    #[error("invalid section: {0}")]
    InvalidSection(&'static str),

    /// The stored sections no longer form a single path
    #[error("invalid section graph: {0}")]
    InvalidGraphState(&'static str),

    /// Line attributes failed validation at creation
    #[error("invalid line: {0}")]
    InvalidLine(&'static str),
}
