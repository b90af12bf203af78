//! Geographic positions supplied by callers.

use geo::Coord;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A WGS84 position expressed as latitude and longitude in degrees.
///
/// Oracles consume [`Coord`] values with `x = longitude` and `y = latitude`;
/// use [`Location::to_coord`] at that boundary.
///
/// # Examples
/// ```
/// use convoy_core::Location;
///
/// let depot = Location::new(51.5, -0.12);
/// let coord = depot.to_coord();
/// assert_eq!(coord.x, -0.12);
/// assert_eq!(coord.y, 51.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// Latitude in degrees, `-90.0..=90.0`.
    pub lat: f64,
    /// Longitude in degrees, `-180.0..=180.0`.
    pub lon: f64,
}

impl Location {
    /// Construct a location from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Convert to a `geo` coordinate (`x = lon`, `y = lat`).
    #[must_use]
    pub const fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    /// Whether both components are finite and inside the WGS84 range.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<Location> for Coord<f64> {
    fn from(location: Location) -> Self {
        location.to_coord()
    }
}

impl From<Coord<f64>> for Location {
    fn from(coord: Coord<f64>) -> Self {
        Self::new(coord.y, coord.x)
    }
}
