//! Facade crate for the Convoy fleet routing engine.
//!
//! This crate re-exports the core domain types and exposes the default solver
//! and oracle adapters behind feature flags.

#![forbid(unsafe_code)]

pub use convoy_core::{
    CancellationToken, Diagnostics, Location, MatrixBuildError, OracleError, PathLeg,
    SolveError, SolveRequest, SolveRequestValidationError, SolveResponse, SolveStatus, Solver,
    Stop, StraightLineOracle, TimeMatrix, TimeWindow, TravelTimeOracle, Vehicle,
    build_time_matrix,
};

#[cfg(feature = "solver-gls")]
pub use convoy_solver_gls::{
    FirstSolutionStrategy, GlsSolver, GlsSolverConfig, LocalSearchMetaheuristic,
};

#[cfg(feature = "oracle-osrm")]
pub use convoy_data::routing::{OsrmOracle, OsrmOracleConfig};
