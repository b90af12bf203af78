#![expect(
    clippy::expect_used,
    reason = "regression tests use expect for readable failures"
)]

//! Golden routes regression tests for the GLS solver.
//!
//! Each case loads a request and a travel-time matrix from JSON, solves it
//! with a fixed-matrix oracle and compares the routes, status and total
//! travel time with recorded values. The instances are small enough that
//! their optimum is unique, so the comparison is exact.
//!
//! Matrix rows follow the solver's node order: vehicle starts, stops, then
//! vehicle ends.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use convoy_core::test_support::FixedMatrixOracle;
use convoy_core::{SolveRequest, SolveStatus, Solver};
use convoy_solver_gls::{GlsSolver, GlsSolverConfig};
use rstest::rstest;
use serde::Deserialize;

/// Deserialised golden route test case.
#[derive(Debug, Deserialize)]
struct GoldenRoute {
    name: String,
    #[expect(dead_code, reason = "kept for documentation in JSON files")]
    description: String,
    request: SolveRequest,
    travel_time_matrix_seconds: Vec<Vec<u64>>,
    expected: ExpectedResult,
}

/// Expected result from JSON.
#[derive(Debug, Deserialize)]
struct ExpectedResult {
    status: SolveStatus,
    routes: BTreeMap<usize, Vec<String>>,
    total_travel_time_s: u64,
}

/// Load a golden route from the data directory.
fn load_golden_route(filename: &str) -> GoldenRoute {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden_routes/data")
        .join(filename);
    let content = fs::read_to_string(&path).expect("failed to read golden route file");
    serde_json::from_str(&content).expect("failed to parse golden route JSON")
}

#[rstest]
#[case("single_stop.json")]
#[case("linear_three.json")]
#[case("capacity_split.json")]
#[case("window_order.json")]
#[case("idle_vehicle.json")]
#[case("unreachable_window.json")]
fn golden_route_regression(#[case] filename: &str) {
    let golden = load_golden_route(filename);
    let oracle =
        FixedMatrixOracle::for_request(&golden.request, golden.travel_time_matrix_seconds);
    let solver = GlsSolver::with_config(
        oracle,
        GlsSolverConfig::default()
            .with_time_limit(Duration::from_millis(500))
            .with_stagnation_limit(100),
    );

    let response = solver
        .solve(&golden.request)
        .expect("golden route should solve without error");

    assert_eq!(
        response.status, golden.expected.status,
        "{}: status mismatch",
        golden.name
    );
    assert_eq!(
        response.routes, golden.expected.routes,
        "{}: route mismatch",
        golden.name
    );
    assert_eq!(
        response.diagnostics.total_travel_time_s, golden.expected.total_travel_time_s,
        "{}: total travel time mismatch",
        golden.name
    );
}
