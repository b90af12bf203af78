//! Deterministic oracles used by unit and behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use geo::{Coord, Distance, Euclidean, Point};

use crate::{OracleError, PathLeg, TravelTimeOracle};

/// Oracle returning planar distance as seconds.
///
/// Coordinates are treated as plain Cartesian points. One coordinate unit
/// takes `seconds_per_unit` seconds, so tests can reason about exact matrix
/// values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EuclideanOracle {
    seconds_per_unit: f64,
    uphill_surcharge: u64,
}

impl Default for EuclideanOracle {
    fn default() -> Self {
        Self {
            seconds_per_unit: 1.0,
            uphill_surcharge: 0,
        }
    }
}

impl EuclideanOracle {
    /// Scale every leg by `seconds_per_unit`.
    #[must_use]
    pub const fn seconds_per_unit(mut self, seconds_per_unit: f64) -> Self {
        self.seconds_per_unit = seconds_per_unit;
        self
    }

    /// Add `seconds` to every leg heading towards a larger `x`.
    ///
    /// Makes the resulting matrix asymmetric.
    #[must_use]
    pub const fn with_uphill_surcharge(mut self, seconds: u64) -> Self {
        self.uphill_surcharge = seconds;
        self
    }
}

impl TravelTimeOracle for EuclideanOracle {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        let distance = Euclidean.distance(Point::from(from), Point::from(to));
        let mut duration = Duration::from_secs_f64(distance * self.seconds_per_unit);
        if to.x > from.x {
            duration += Duration::from_secs(self.uphill_surcharge);
        }
        Ok(PathLeg {
            polyline: vec![from, to],
            distance_m: distance,
            duration,
        })
    }
}

/// Oracle that fails with a fixed error.
///
/// [`FailingOracle::always`] fails every query; [`FailingOracle::towards`]
/// fails only for legs ending at one coordinate and otherwise behaves like
/// [`EuclideanOracle::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct FailingOracle {
    target: Option<Coord<f64>>,
    error: OracleError,
}

impl FailingOracle {
    /// Fail every query with `error`.
    #[must_use]
    pub const fn always(error: OracleError) -> Self {
        Self {
            target: None,
            error,
        }
    }

    /// Fail queries whose destination is `target`.
    #[must_use]
    pub const fn towards(target: Coord<f64>, error: OracleError) -> Self {
        Self {
            target: Some(target),
            error,
        }
    }
}

impl TravelTimeOracle for FailingOracle {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        match self.target {
            Some(target) if target != to => EuclideanOracle::default().shortest_path(from, to),
            _ => Err(self.error.clone()),
        }
    }
}

/// Wraps another oracle and counts how often it is queried.
#[derive(Debug, Default)]
pub struct CountingOracle<O> {
    inner: O,
    calls: AtomicUsize,
}

impl<O> CountingOracle<O> {
    /// Wrap `inner`.
    pub const fn new(inner: O) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of queries seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<O: TravelTimeOracle> TravelTimeOracle for CountingOracle<O> {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.shortest_path(from, to)
    }
}

/// A [`TravelTimeOracle`] answering from a fixed matrix.
///
/// Coordinates are matched exactly against the list given at construction;
/// the first match wins, so repeated coordinates must share their rows and
/// columns. Unknown coordinates produce a [`OracleError::ServiceError`] with
/// code `UNKNOWN_COORDINATE`; a short matrix produces `DIMENSION_MISMATCH`.
#[derive(Debug, Clone)]
pub struct FixedMatrixOracle {
    coords: Vec<Coord<f64>>,
    seconds: Vec<Vec<u64>>,
}

impl FixedMatrixOracle {
    /// Construct an oracle over `coords` with travel times in `seconds`.
    #[must_use]
    pub const fn new(coords: Vec<Coord<f64>>, seconds: Vec<Vec<u64>>) -> Self {
        Self { coords, seconds }
    }

    /// Construct an oracle whose rows follow the solver's node order:
    /// vehicle starts, stops, then vehicle ends.
    #[must_use]
    pub fn for_request(request: &crate::SolveRequest, seconds: Vec<Vec<u64>>) -> Self {
        let starts = request.vehicles.iter().map(|v| v.start.to_coord());
        let stops = request.stops.iter().map(|s| s.location.to_coord());
        let ends = request.vehicles.iter().map(|v| v.end_location().to_coord());
        Self::new(starts.chain(stops).chain(ends).collect(), seconds)
    }

    fn index_of(&self, coord: Coord<f64>) -> Result<usize, OracleError> {
        self.coords
            .iter()
            .position(|known| *known == coord)
            .ok_or_else(|| OracleError::ServiceError {
                code: "UNKNOWN_COORDINATE".to_owned(),
                message: format!("no matrix row for ({}, {})", coord.x, coord.y),
            })
    }
}

impl TravelTimeOracle for FixedMatrixOracle {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        let row = self.index_of(from)?;
        let column = self.index_of(to)?;
        let seconds = self
            .seconds
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .ok_or_else(|| OracleError::ServiceError {
                code: "DIMENSION_MISMATCH".to_owned(),
                message: format!("matrix has no cell ({row}, {column})"),
            })?;
        Ok(PathLeg {
            polyline: vec![from, to],
            distance_m: 0.0,
            duration: Duration::from_secs(seconds),
        })
    }
}
