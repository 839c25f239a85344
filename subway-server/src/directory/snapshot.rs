//! JSON file storage for the line directory.

use std::path::{Path, PathBuf};

use super::error::DirectoryError;
use super::record::DirectorySnapshot;

/// Stores the whole directory as one pretty-printed JSON document.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so a reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the snapshot.
    ///
    /// Returns `None` if the file does not exist yet. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(&self) -> Result<Option<DirectorySnapshot>, DirectoryError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DirectoryError::snapshot(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let snapshot = serde_json::from_str(&contents).map_err(|e| {
            DirectoryError::snapshot(format!("failed to parse {}: {e}", self.path.display()))
        })?;
        Ok(Some(snapshot))
    }

    /// Save the snapshot.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, snapshot: &DirectorySnapshot) -> Result<(), DirectoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DirectoryError::snapshot(format!("failed to create snapshot directory: {e}"))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| DirectoryError::snapshot(format!("failed to serialize snapshot: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| DirectoryError::snapshot(format!("failed to write snapshot: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| DirectoryError::snapshot(format!("failed to replace snapshot: {e}")))?;

        Ok(())
    }

    /// Get the snapshot file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
