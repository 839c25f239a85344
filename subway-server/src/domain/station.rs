//! Station identity and name types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a station name fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station name: {reason}")]
pub struct InvalidStationName {
    reason: &'static str,
}

/// Identifier of a station record, assigned by the line directory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(u64);

impl StationId {
    /// Wrap a raw identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated station name.
///
/// Names are trimmed of surrounding whitespace and must not be empty
/// afterwards.
///
/// # Examples
///
/// ```
/// use subway_server::domain::StationName;
///
/// let name = StationName::new("  강남 ").unwrap();
/// assert_eq!(name.as_str(), "강남");
///
/// assert!(StationName::new("").is_err());
/// assert!(StationName::new("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationName(String);

impl StationName {
    /// Validate and wrap a station name.
    pub fn new(s: impl AsRef<str>) -> Result<Self, InvalidStationName> {
        let trimmed = s.as_ref().trim();
        if trimmed.is_empty() {
            return Err(InvalidStationName {
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

impl fmt::Debug for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationName({})", self.0)
    }
}

impl fmt::Display for StationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named point on the network.
///
/// Stations are immutable once the directory has assigned their id.
/// Equality is by identity and name together, so two records with the
/// same id but different names never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Station {
    id: StationId,
    name: StationName,
}

impl Station {
    /// Create a station record.
    pub fn new(id: StationId, name: StationName) -> Self {
        Self { id, name }
    }

    /// Returns the station identifier.
    pub fn id(&self) -> StationId {
        self.id
    }

    /// Returns the station name.
    pub fn name(&self) -> &StationName {
        &self.name
    }
}
