//! Line directory error types.

use crate::domain::{LineError, LineId, StationId};

/// Errors that can occur when loading, changing, or saving lines.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Another line or station already uses this name
    #[error("name already in use: {0}")]
    DuplicateName(String),

    /// No line with this id
    #[error("line {0} not found")]
    LineNotFound(LineId),

    /// No station record with this id
    #[error("station {0} not found")]
    StationNotFound(StationId),

    /// The supplied name failed validation
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The line rejected the change
    #[error(transparent)]
    Line(#[from] LineError),

    /// Reading or writing the snapshot file failed
    #[error("snapshot error: {message}")]
    Snapshot { message: String },
}

impl DirectoryError {
    pub(crate) fn snapshot(message: impl Into<String>) -> Self {
        DirectoryError::Snapshot {
            message: message.into(),
        }
    }
}
