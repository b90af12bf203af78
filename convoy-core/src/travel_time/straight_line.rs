//! Great-circle oracle for use without a road network.

use std::time::Duration;

use geo::{Coord, Distance, Haversine, Point};
use thiserror::Error;

use super::error::OracleError;
use super::oracle::{PathLeg, TravelTimeOracle};

/// Average speed used by [`StraightLineOracle::default`].
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Error returned when a speed is not a positive, finite number.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("average speed must be positive and finite, got {speed_kmh} km/h")]
pub struct InvalidSpeedError {
    /// The rejected speed.
    pub speed_kmh: f64,
}

/// Travel times from great-circle distance at a constant average speed.
///
/// The polyline is the straight segment between the two endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineOracle {
    speed_kmh: f64,
}

impl Default for StraightLineOracle {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl StraightLineOracle {
    /// Construct an oracle travelling at `speed_kmh`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSpeedError`] for zero, negative or non-finite speeds.
    pub fn with_speed_kmh(speed_kmh: f64) -> Result<Self, InvalidSpeedError> {
        if speed_kmh.is_finite() && speed_kmh > 0.0 {
            Ok(Self { speed_kmh })
        } else {
            Err(InvalidSpeedError { speed_kmh })
        }
    }

    /// The configured average speed.
    #[must_use]
    pub const fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }
}

impl TravelTimeOracle for StraightLineOracle {
    #[expect(
        clippy::float_arithmetic,
        reason = "travel time is derived from a floating-point distance and speed"
    )]
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        let distance_m = Haversine.distance(Point::from(from), Point::from(to));
        let metres_per_second = self.speed_kmh / 3.6;
        let seconds = distance_m / metres_per_second;
        let duration = Duration::try_from_secs_f64(seconds).map_err(|_| OracleError::NoRoute)?;
        Ok(PathLeg {
            polyline: vec![from, to],
            distance_m,
            duration,
        })
    }
}
