//! Routing-service adapters for the Convoy engine.
//!
//! Responsibilities:
//! - Implement [`convoy_core::TravelTimeOracle`] against external routing
//!   services.
//! - Encapsulate the wire formats those services speak.
//!
//! Boundaries:
//! - Do not encode domain rules (live in `convoy-core`).
//! - Keep blocking I/O off async executors; prefer async-capable clients.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.

pub mod routing;
