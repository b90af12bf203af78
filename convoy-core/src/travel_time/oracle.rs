//! The travel-time oracle trait and the path it returns.

use std::sync::Arc;
use std::time::Duration;

use geo::Coord;

use super::error::OracleError;

/// A path between two coordinates as reported by an oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct PathLeg {
    /// Ordered coordinates along the path, origin first.
    pub polyline: Vec<Coord<f64>>,
    /// Path length in metres.
    pub distance_m: f64,
    /// Travel time along the path.
    pub duration: Duration,
}

/// Compute the shortest path between two coordinates.
///
/// Implementations are treated as pure: the same pair is expected to give the
/// same answer within one solve. Directions may differ, so `(a, b)` and
/// `(b, a)` are queried separately.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use geo::Coord;
/// use convoy_core::{OracleError, PathLeg, TravelTimeOracle};
///
/// struct TenSeconds;
///
/// impl TravelTimeOracle for TenSeconds {
///     fn shortest_path(
///         &self,
///         from: Coord<f64>,
///         to: Coord<f64>,
///     ) -> Result<PathLeg, OracleError> {
///         Ok(PathLeg {
///             polyline: vec![from, to],
///             distance_m: 100.0,
///             duration: Duration::from_secs(10),
///         })
///     }
/// }
///
/// let leg = TenSeconds.shortest_path(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 })?;
/// assert_eq!(leg.duration.as_secs(), 10);
/// # Ok::<(), OracleError>(())
/// ```
pub trait TravelTimeOracle {
    /// Return the path from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when no path can be computed.
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError>;
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for &T {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        (**self).shortest_path(from, to)
    }
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for Box<T> {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        (**self).shortest_path(from, to)
    }
}

impl<T: TravelTimeOracle + ?Sized> TravelTimeOracle for Arc<T> {
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        (**self).shortest_path(from, to)
    }
}
