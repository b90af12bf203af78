//! Solve requests, responses and the [`Solver`] trait.

use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::fleet::TimeWindowError;
use crate::{CancellationToken, MatrixBuildError, Stop, TimeWindow, Vehicle};

/// Parameters for a solve request.
///
/// # Examples
/// ```rust
/// use convoy_core::{Location, SolveRequest, Stop, Vehicle};
///
/// let depot = Location::new(0.0, 0.0);
/// let request = SolveRequest {
///     vehicles: vec![Vehicle::new("van", depot)],
///     stops: vec![Stop::new("a", Location::new(0.0, 0.01))],
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveRequest {
    /// Fleet available for the solve.
    pub vehicles: Vec<Vehicle>,
    /// Stops that must all be served.
    pub stops: Vec<Stop>,
}

/// Detailed validation failures for [`SolveRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveRequestValidationError {
    /// The request named no vehicles.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// The request named no stops.
    #[error("at least one stop is required")]
    NoStops,
    /// A vehicle start or end lies outside the WGS84 range.
    #[error("vehicle {vehicle_id} has an invalid start or end location")]
    InvalidVehicleLocation {
        /// Offending vehicle.
        vehicle_id: String,
    },
    /// A stop lies outside the WGS84 range.
    #[error("stop {stop_id} has an invalid location")]
    InvalidStopLocation {
        /// Offending stop.
        stop_id: String,
    },
    /// A stop's window closes before it opens.
    #[error("stop {stop_id} has a malformed time window: {source}")]
    InvalidTimeWindow {
        /// Offending stop.
        stop_id: String,
        /// The rejected bounds.
        #[source]
        source: TimeWindowError,
    },
    /// Two vehicles share an identifier.
    #[error("vehicle id {vehicle_id} is used more than once")]
    DuplicateVehicleId {
        /// Repeated identifier.
        vehicle_id: String,
    },
    /// Two stops share an identifier.
    #[error("stop id {stop_id} is used more than once")]
    DuplicateStopId {
        /// Repeated identifier.
        stop_id: String,
    },
}

impl SolveRequest {
    /// Check the request before any matrix or model is built.
    ///
    /// # Errors
    ///
    /// Returns the first [`SolveRequestValidationError`] found.
    pub fn validate(&self) -> Result<(), SolveRequestValidationError> {
        if self.vehicles.is_empty() {
            return Err(SolveRequestValidationError::NoVehicles);
        }
        if self.stops.is_empty() {
            return Err(SolveRequestValidationError::NoStops);
        }
        self.validate_vehicles()?;
        self.validate_stops()
    }

    fn validate_vehicles(&self) -> Result<(), SolveRequestValidationError> {
        let mut seen = HashSet::with_capacity(self.vehicles.len());
        for vehicle in &self.vehicles {
            if !vehicle.start.is_valid() || !vehicle.end_location().is_valid() {
                return Err(SolveRequestValidationError::InvalidVehicleLocation {
                    vehicle_id: vehicle.id.clone(),
                });
            }
            if !seen.insert(vehicle.id.as_str()) {
                return Err(SolveRequestValidationError::DuplicateVehicleId {
                    vehicle_id: vehicle.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_stops(&self) -> Result<(), SolveRequestValidationError> {
        let mut seen = HashSet::with_capacity(self.stops.len());
        for stop in &self.stops {
            if !stop.location.is_valid() {
                return Err(SolveRequestValidationError::InvalidStopLocation {
                    stop_id: stop.id.clone(),
                });
            }
            if let (Some(ready), Some(due)) = (stop.ready_ts, stop.due_ts) {
                TimeWindow::new(ready, due).map_err(|source| {
                    SolveRequestValidationError::InvalidTimeWindow {
                        stop_id: stop.id.clone(),
                        source,
                    }
                })?;
            }
            if !seen.insert(stop.id.as_str()) {
                return Err(SolveRequestValidationError::DuplicateStopId {
                    stop_id: stop.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Sum of all stop demands.
    #[must_use]
    pub fn total_demand(&self) -> u64 {
        self.stops.iter().map(|stop| u64::from(stop.demand)).sum()
    }
}

/// Outcome of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SolveStatus {
    /// Every stop was assigned to a feasible route.
    Solved,
    /// No feasible assignment was found within the search budget.
    Infeasible,
}

/// Diagnostic information about a solve.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostics {
    /// Wall-clock time spent on the whole solve.
    pub solve_time: Duration,
    /// Number of nodes in the travel-time matrix.
    pub matrix_nodes: usize,
    /// Total travel time of the returned routes, in seconds.
    pub total_travel_time_s: u64,
    /// Local-search iterations performed.
    pub iterations: u64,
}

/// Response from a solve.
///
/// `routes` maps a vehicle index to its ordered stop identifiers. An empty
/// map together with [`SolveStatus::Infeasible`] signals that no feasible
/// solution was found.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResponse {
    /// Ordered stop ids per vehicle index.
    pub routes: BTreeMap<usize, Vec<String>>,
    /// Whether a feasible solution was found.
    pub status: SolveStatus,
    /// Diagnostic information about the solve.
    pub diagnostics: Diagnostics,
}

impl SolveResponse {
    /// A feasible response.
    #[must_use]
    pub const fn solved(routes: BTreeMap<usize, Vec<String>>, diagnostics: Diagnostics) -> Self {
        Self {
            routes,
            status: SolveStatus::Solved,
            diagnostics,
        }
    }

    /// A well-formed response carrying no routes.
    #[must_use]
    pub const fn infeasible(diagnostics: Diagnostics) -> Self {
        Self {
            routes: BTreeMap::new(),
            status: SolveStatus::Infeasible,
            diagnostics,
        }
    }

    /// Whether a feasible solution was found.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status == SolveStatus::Solved
    }

    /// Stop ids assigned to `vehicle`, in visiting order.
    #[must_use]
    pub fn route(&self, vehicle: usize) -> Option<&[String]> {
        self.routes.get(&vehicle).map(Vec::as_slice)
    }
}

/// Errors returned by [`Solver::solve`].
///
/// Infeasibility is not an error; see [`SolveResponse::infeasible`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// Request parameters were invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] SolveRequestValidationError),
    /// The travel-time oracle failed while building the matrix.
    #[error("could not build distance matrix: {0}")]
    MatrixBuild(#[from] MatrixBuildError),
    /// The routing model could not be assembled.
    #[error("could not build routing model: {message}")]
    Model {
        /// Description of the modelling failure.
        message: String,
    },
}

/// Assign stops to vehicles and sequence each route.
///
/// Implementations must return [`SolveError::InvalidRequest`] for invalid
/// parameters rather than panicking, and must be `Send + Sync` so one solver
/// can serve concurrent requests.
pub trait Solver: Send + Sync {
    /// Solve a request without external cancellation.
    ///
    /// # Errors
    ///
    /// See [`SolveError`].
    fn solve(&self, request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        self.solve_with_cancellation(request, &CancellationToken::new())
    }

    /// Solve a request, stopping early once `cancellation` is raised.
    ///
    /// # Errors
    ///
    /// See [`SolveError`].
    fn solve_with_cancellation(
        &self,
        request: &SolveRequest,
        cancellation: &CancellationToken,
    ) -> Result<SolveResponse, SolveError>;
}
