//! Unit tests for loading requests, layering options and running solves.

use super::helpers::{Workspace, sample_request, write_request, write_utf8};
use super::*;
use crate::oracle::OracleSelection;
use crate::solve::{
    DefaultSolverBuilder, SolveConfig, SolverBuilder, config_from_layers_for_test,
    load_solve_request, run_solve_with,
};
use convoy_core::{Diagnostics, SolveError, SolveRequest, SolveResponse, SolveStatus, Solver};
use rstest::{fixture, rstest};
use std::collections::BTreeMap;
use std::time::Duration;

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

/// Solver that ignores its input and answers with a fixed response.
struct CannedSolver {
    response: SolveResponse,
}

impl Solver for CannedSolver {
    fn solve_with_cancellation(
        &self,
        _request: &SolveRequest,
        _cancellation: &convoy_core::CancellationToken,
    ) -> Result<SolveResponse, SolveError> {
        Ok(self.response.clone())
    }
}

struct CannedSolverBuilder {
    response: SolveResponse,
}

impl SolverBuilder for CannedSolverBuilder {
    fn build(&self, _config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        Ok(Box::new(CannedSolver {
            response: self.response.clone(),
        }))
    }
}

fn canned_response() -> SolveResponse {
    SolveResponse::solved(
        BTreeMap::from([(0, vec!["a".to_owned(), "b".to_owned()]), (1, Vec::new())]),
        Diagnostics::default(),
    )
}

#[rstest]
fn load_solve_request_round_trips_json(workspace: Workspace) {
    let request_path = workspace.path("request.json");
    let request = sample_request();
    write_request(&request_path, &request);

    let decoded = load_solve_request(&request_path).expect("request should decode");
    assert_eq!(decoded, request);
}

#[rstest]
fn load_solve_request_rejects_invalid_json(workspace: Workspace) {
    let request_path = workspace.path("request.json");
    write_utf8(&request_path, b"{ not valid json");

    let err = load_solve_request(&request_path).expect_err("invalid json should error");
    match err {
        CliError::ParseSolveRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_solve_request_rejects_negative_demand(workspace: Workspace) {
    let request_path = workspace.path("request.json");
    write_utf8(
        &request_path,
        br#"{"vehicles":[{"id":"v","start":{"lat":0.0,"lon":0.0}}],
            "stops":[{"id":"s","lat":0.0,"lon":0.01,"demand":-1}]}"#,
    );

    let err = load_solve_request(&request_path).expect_err("negative demand");
    assert!(matches!(err, CliError::ParseSolveRequest { .. }));
}

#[rstest]
fn load_solve_request_io_error_returns_open_error(workspace: Workspace) {
    let request_path = workspace.path("request.json");

    let err = load_solve_request(&request_path).expect_err("missing request should error");
    match err {
        CliError::OpenSolveRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("expected OpenSolveRequest, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence(workspace: Workspace) {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let env_request = workspace.path("from-env-request.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "oracle": "osrm",
            "osrm_base_url": "http://from-file:5000",
            "time_limit_secs": 60,
        }),
        None,
    );
    composer.push_environment(json!({
        "request_path": env_request.as_str(),
        "time_limit_secs": 20,
    }));
    composer.push_cli(json!({ "time_limit_secs": 5 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.time_limit, Duration::from_secs(5));
    assert_eq!(
        config.oracle,
        OracleSelection::Osrm {
            base_url: "http://from-file:5000".to_owned(),
            profile: "driving".to_owned(),
        }
    );
}

#[rstest]
fn responses_can_be_written_to_a_file(workspace: Workspace) {
    let request_path = workspace.path("request.json");
    let output_path = workspace.path("out/response.json");
    write_request(&request_path, &sample_request());
    let args = SolveArgs {
        request_path: Some(request_path),
        output: Some(output_path.clone()),
        ..SolveArgs::default()
    };
    let builder = CannedSolverBuilder {
        response: canned_response(),
    };

    let mut stdout = Vec::new();
    run_solve_with(args, &builder, &mut stdout).expect("solve succeeds");

    assert!(stdout.is_empty());
    let written = convoy_fs::read_utf8(&output_path).expect("response file");
    let response: SolveResponse = serde_json::from_str(&written).expect("response JSON");
    assert_eq!(response, canned_response());
}

#[rstest]
fn invalid_requests_never_reach_the_solver(workspace: Workspace) {
    let request_path = workspace.path("request.json");
    let mut request = sample_request();
    request.stops.clear();
    write_request(&request_path, &request);
    let args = SolveArgs {
        request_path: Some(request_path),
        ..SolveArgs::default()
    };
    let builder = CannedSolverBuilder {
        response: canned_response(),
    };

    let mut stdout = Vec::new();
    let err = run_solve_with(args, &builder, &mut stdout).expect_err("empty stop list");
    assert!(matches!(err, CliError::InvalidSolveRequest { .. }));
    assert!(stdout.is_empty());
}

#[rstest]
fn default_builder_solves_with_straight_line_times(workspace: Workspace) {
    let request_path = workspace.path("request.json");
    write_request(&request_path, &sample_request());
    let args = SolveArgs {
        request_path: Some(request_path),
        time_limit_secs: Some(1),
        ..SolveArgs::default()
    };

    let mut stdout = Vec::new();
    run_solve_with(args, &DefaultSolverBuilder, &mut stdout).expect("solve succeeds");

    let response: SolveResponse = serde_json::from_slice(&stdout).expect("response JSON");
    assert_eq!(response.status, SolveStatus::Solved);
    let mut served: Vec<&str> = response
        .routes
        .values()
        .flatten()
        .map(String::as_str)
        .collect();
    served.sort_unstable();
    assert_eq!(served, ["a", "b", "c"]);
    assert!(response.routes.values().all(|route| route.len() <= 2));
}
