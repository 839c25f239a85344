//! Application state for the web layer.

use crate::directory::LineDirectory;

/// Shared application state.
///
/// The directory is internally reference counted, so cloning the state per
/// request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Stations and lines
    pub directory: LineDirectory,
}

impl AppState {
    /// Create a new app state.
    pub fn new(directory: LineDirectory) -> Self {
        Self { directory }
    }
}
