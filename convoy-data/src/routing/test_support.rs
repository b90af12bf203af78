//! Test utilities for routing oracles.
//!
//! This module provides [`StubOracle`], a deterministic test double for
//! [`TravelTimeOracle`] that returns pre-configured legs without making
//! actual HTTP requests.

use std::time::Duration;

use convoy_core::{OracleError, PathLeg, TravelTimeOracle};
use geo::Coord;

/// Stub `TravelTimeOracle` for testing.
///
/// This oracle returns pre-configured responses, allowing tests to verify
/// behaviour without requiring a running OSRM service. Legs between equal
/// coordinates always take zero seconds.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use convoy_core::TravelTimeOracle;
/// use convoy_data::routing::test_support::StubOracle;
/// use geo::Coord;
///
/// let oracle = StubOracle::with_leg_duration(Duration::from_secs(60));
/// let leg = oracle.shortest_path(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
/// assert_eq!(leg.map(|leg| leg.duration), Ok(Duration::from_secs(60)));
/// ```
#[derive(Debug, Clone)]
pub struct StubOracle {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Duration(Duration),
    Error(OracleError),
}

impl StubOracle {
    /// Create an oracle whose legs all take `duration`.
    #[must_use]
    pub const fn with_leg_duration(duration: Duration) -> Self {
        Self {
            response: StubResponse::Duration(duration),
        }
    }

    /// Create an oracle that fails every leg between distinct coordinates
    /// with `error`.
    #[must_use]
    pub const fn with_error(error: OracleError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }

    /// Create an oracle whose legs all take one second.
    #[must_use]
    pub const fn with_unit_legs() -> Self {
        Self::with_leg_duration(Duration::from_secs(1))
    }
}

impl TravelTimeOracle for StubOracle {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        if from == to {
            return Ok(PathLeg {
                polyline: vec![from],
                distance_m: 0.0,
                duration: Duration::ZERO,
            });
        }

        match &self.response {
            StubResponse::Duration(duration) => Ok(PathLeg {
                polyline: vec![from, to],
                distance_m: 0.0,
                duration: *duration,
            }),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
