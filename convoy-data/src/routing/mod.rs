//! HTTP-based travel-time oracles for routing services.
//!
//! This module provides [`OsrmOracle`], an implementation of
//! [`convoy_core::TravelTimeOracle`] that asks an OSRM routing service for
//! the fastest path between two coordinates.
//!
//! # Architecture
//!
//! Each query is one request to the OSRM Route API. The synchronous
//! [`TravelTimeOracle`](convoy_core::TravelTimeOracle) trait is implemented
//! by blocking on async HTTP calls internally, keeping the core library
//! embeddable in synchronous contexts.
//!
//! # Example
//!
//! ```no_run
//! use convoy_core::TravelTimeOracle;
//! use convoy_data::routing::{OsrmOracle, OsrmOracleConfig};
//! use geo::Coord;
//! use std::time::Duration;
//!
//! let config = OsrmOracleConfig::new("http://localhost:5000")
//!     .with_profile("driving")
//!     .with_timeout(Duration::from_secs(10));
//! let oracle = OsrmOracle::with_config(config)?;
//!
//! let leg = oracle.shortest_path(Coord { x: -0.1, y: 51.5 }, Coord { x: -0.2, y: 51.6 })?;
//! println!("{:?} over {} m", leg.duration, leg.distance_m);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_PROFILE, DEFAULT_USER_AGENT, OracleBuildError, OsrmOracle, OsrmOracleConfig,
};
