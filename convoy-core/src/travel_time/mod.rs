//! Point-to-point travel times and the all-pairs matrix built from them.
//!
//! The [`TravelTimeOracle`] trait abstracts a road-network provider behind a
//! single operation: given two coordinates, return a path with its distance
//! and duration. [`build_time_matrix`] queries an oracle for every ordered
//! pair of a coordinate list and produces a [`TimeMatrix`] in whole seconds.
//!
//! Oracle failures are fatal to a matrix build; no partial matrix is ever
//! returned.

mod error;
mod matrix;
mod oracle;
mod straight_line;

pub use error::{MatrixBuildError, MatrixShapeError, OracleError};
pub use matrix::{TimeMatrix, build_time_matrix};
pub use oracle::{PathLeg, TravelTimeOracle};
pub use straight_line::{DEFAULT_SPEED_KMH, InvalidSpeedError, StraightLineOracle};
