//! Section distance type.

use std::fmt;

/// Error returned when a distance cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid distance: {reason}")]
pub struct InvalidDistance {
    reason: &'static str,
}

/// Micrometres in one kilometre.
const MICROMETRES_PER_KM: f64 = 1.0e9;

/// Largest distance accepted from kilometre input.
const MAX_KM: f64 = 1.0e6;

/// Smallest slack allowed between a scaled input and its nearest micrometre.
/// Decimal kilometre literals are inexact in binary floating point.
const ROUNDING_SLACK: f64 = 1.0e-3;

/// Distance along a section, held in whole micrometres.
///
/// Sums and differences are exact. Kilometre input finer than a micrometre
/// is rejected rather than rounded, so a positive input never becomes zero
/// and two different inputs never collapse to the same value. The raw value
/// may be zero or negative; a line only accepts positive distances for its
/// sections.
///
/// # Examples
///
/// ```
/// use subway_server::domain::Distance;
///
/// let whole = Distance::from_km(2.0).unwrap();
/// let part = Distance::from_km(0.8).unwrap();
/// assert_eq!(whole.checked_sub(part), Some(Distance::from_km(1.2).unwrap()));
/// assert_eq!(part.as_micrometres(), 800_000_000);
/// assert!(Distance::from_km(1.0e-12).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Distance(i64);

impl Distance {
    /// Build from whole micrometres.
    pub fn from_micrometres(micrometres: i64) -> Self {
        Self(micrometres)
    }

    /// Build from kilometres.
    ///
    /// Fails for non-finite input, for magnitudes above a million kilometres,
    /// and for input with precision finer than a micrometre.
    pub fn from_km(km: f64) -> Result<Self, InvalidDistance> {
        if !km.is_finite() {
            return Err(InvalidDistance {
                reason: "distance must be a finite number",
            });
        }
        if km.abs() > MAX_KM {
            return Err(InvalidDistance {
                reason: "distance out of range",
            });
        }

        let scaled = km * MICROMETRES_PER_KM;
        let rounded = scaled.round();
        let slack = ROUNDING_SLACK.max(scaled.abs() * 4.0 * f64::EPSILON);
        if (scaled - rounded).abs() > slack || (km != 0.0 && rounded == 0.0) {
            return Err(InvalidDistance {
                reason: "distance is finer than a micrometre",
            });
        }
        Ok(Self(rounded as i64))
    }

    /// Returns the distance in micrometres.
    pub fn as_micrometres(&self) -> i64 {
        self.0
    }

    /// Returns the distance in kilometres.
    pub fn as_km(&self) -> f64 {
        self.0 as f64 / MICROMETRES_PER_KM
    }

    /// Returns true for strictly positive distances.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Sum of two distances, `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Difference of two distances, `None` on overflow.
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({}um)", self.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}km", self.as_km())
    }
}
