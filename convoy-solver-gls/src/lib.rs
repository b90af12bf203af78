//! Capacitated vehicle routing with time windows for Convoy.
//!
//! This crate provides [`GlsSolver`], the default implementation of the
//! [`Solver`](convoy_core::Solver) trait. A solve builds a travel-time matrix
//! over vehicle starts, stops and vehicle ends, wires a [`RoutingModel`] with
//! time, capacity and time-window dimensions, constructs an initial plan with
//! a cheapest-arc heuristic and improves it with guided local search until
//! its time limit expires.
//!
//! The lower layers are public so callers with a precomputed matrix can drive
//! [`RoutingModelBuilder`] and [`SearchEngine`] directly.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod decode;
mod dimension;
mod model;
mod search;
mod solver;

pub use decode::{decode, decode_routes};
pub use dimension::{
    CapacityDimension, DEFAULT_HORIZON_SECS, TimeDimension, TimeDimensionConfig, Violation,
};
pub use model::{ModelError, NodeSpace, RoutingModel, RoutingModelBuilder, Schedule};
pub use search::{
    Assignment, DEFAULT_LAMBDA_COEFFICIENT, DEFAULT_STAGNATION_LIMIT, DEFAULT_TIME_LIMIT,
    FirstSolutionStrategy, LocalSearchMetaheuristic, SearchEngine, SearchOutcome,
    SearchParameters,
};
pub use solver::{GlsSolver, GlsSolverConfig};
