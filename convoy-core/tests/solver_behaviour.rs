//! Tests for the `Solver` trait using a dummy implementation.

use std::collections::BTreeMap;

use convoy_core::{
    CancellationToken, Diagnostics, Location, SolveError, SolveRequest, SolveResponse,
    SolveStatus, Solver, Stop, Vehicle,
};
use rstest::rstest;

/// Puts every stop on the first vehicle, or gives up when cancelled.
struct FirstVehicleSolver;

impl Solver for FirstVehicleSolver {
    fn solve_with_cancellation(
        &self,
        request: &SolveRequest,
        cancellation: &CancellationToken,
    ) -> Result<SolveResponse, SolveError> {
        request.validate()?;
        if cancellation.is_cancelled() {
            return Ok(SolveResponse::infeasible(Diagnostics::default()));
        }
        let ids = request.stops.iter().map(|stop| stop.id.clone()).collect();
        Ok(SolveResponse::solved(
            BTreeMap::from([(0, ids)]),
            Diagnostics::default(),
        ))
    }
}

fn request(stops: usize) -> SolveRequest {
    let depot = Location::new(51.5, -0.1);
    SolveRequest {
        vehicles: vec![Vehicle::new("v0", depot)],
        stops: (0..stops)
            .map(|i| Stop::new(format!("s{i}"), Location::new(51.5, -0.1 + i as f64 * 0.01)))
            .collect(),
    }
}

#[rstest]
#[case(2, true)]
#[case(0, false)]
fn solver_returns_expected(#[case] stops: usize, #[case] should_succeed: bool) {
    let result = FirstVehicleSolver.solve(&request(stops));
    assert_eq!(result.is_ok(), should_succeed);
    if let Err(err) = result {
        assert!(matches!(err, SolveError::InvalidRequest(_)));
    }
}

#[rstest]
fn solvers_are_object_safe() {
    let solver: Box<dyn Solver> = Box::new(FirstVehicleSolver);
    let response = solver.solve(&request(3)).expect("valid request");
    assert_eq!(response.status, SolveStatus::Solved);
    assert_eq!(
        response.route(0),
        Some(&["s0".to_owned(), "s1".to_owned(), "s2".to_owned()][..])
    );
}

#[rstest]
fn cancellation_is_shared_between_clones() {
    let token = CancellationToken::new();
    let handle = token.clone();
    handle.cancel();
    let response = FirstVehicleSolver
        .solve_with_cancellation(&request(1), &token)
        .expect("valid request");
    assert!(!response.is_solved());
    assert!(response.routes.is_empty());
}
