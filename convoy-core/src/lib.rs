//! Core domain types for the Convoy routing engine.
//!
//! The crate defines the fleet and stop models, the [`TravelTimeOracle`]
//! seam, the travel-time matrix builder and the [`Solver`] contract. Solver
//! back-ends live in their own crates and depend on these types only.
//!
//! Constructors and validators return `Result` so invalid input surfaces
//! before any expensive work starts.

pub mod cancel;
pub mod fleet;
pub mod location;
pub mod solver;
pub mod travel_time;

pub use cancel::CancellationToken;
pub use fleet::{
    DEFAULT_STOP_DEMAND, DEFAULT_VEHICLE_CAPACITY, Stop, TimeWindow, TimeWindowError, Vehicle,
};
pub use location::Location;
pub use solver::{
    Diagnostics, SolveError, SolveRequest, SolveRequestValidationError, SolveResponse,
    SolveStatus, Solver,
};
pub use travel_time::{
    DEFAULT_SPEED_KMH, InvalidSpeedError, MatrixBuildError, MatrixShapeError, OracleError,
    PathLeg, StraightLineOracle, TimeMatrix, TravelTimeOracle, build_time_matrix,
};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
