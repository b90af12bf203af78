//! Behaviour-driven step definitions driving the solve CLI scenarios.

use super::helpers::{Workspace, sample_request, write_request, write_utf8};
use super::*;
use crate::solve::{SolveConfig, SolverBuilder, run_solve_with};
use camino::Utf8PathBuf;
use convoy_core::{SolveRequestValidationError, SolveResponse, SolveStatus, Solver};
use convoy_solver_gls::{GlsSolver, GlsSolverConfig};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::time::Duration;

#[derive(Debug)]
struct SolveWorld {
    workspace: Workspace,
    include_request: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl SolveWorld {
    fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            include_request: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn request_path(&self) -> Utf8PathBuf {
        self.workspace.path("request.json")
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["convoy".to_owned(), "solve".to_owned()];
        if *self.include_request.borrow() {
            argv.push(self.request_path().into_string());
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected error")
        })
    }
}

#[fixture]
fn world() -> SolveWorld {
    SolveWorld::new()
}

/// Guided local search over straight-line times with a short budget.
struct QuickSolverBuilder;

impl SolverBuilder for QuickSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        let oracle = config.oracle.build()?;
        let solver_config = GlsSolverConfig::default()
            .with_time_limit(Duration::from_millis(200))
            .with_stagnation_limit(50);
        Ok(Box::new(GlsSolver::with_config(oracle, solver_config)))
    }
}

#[given("a valid solve request exists on disk")]
fn valid_solve_request_exists(#[from(world)] world: &SolveWorld) {
    write_request(&world.request_path(), &sample_request());
}

#[given("the solve request contains invalid JSON")]
fn solve_request_contains_invalid_json(#[from(world)] world: &SolveWorld) {
    write_utf8(&world.request_path(), b"{ not valid json");
}

#[given("the solve request has no vehicles")]
fn solve_request_has_no_vehicles(#[from(world)] world: &SolveWorld) {
    let mut request = sample_request();
    request.vehicles.clear();
    write_request(&world.request_path(), &request);
}

#[given("I omit the solve request path")]
fn omit_solve_request_path(#[from(world)] world: &SolveWorld) {
    *world.include_request.borrow_mut() = false;
}

#[given("I select an oracle the CLI does not know")]
fn select_unknown_oracle(#[from(world)] world: &SolveWorld) {
    world
        .cli_args
        .borrow_mut()
        .extend([format!("--{ARG_ORACLE}"), "teleport".to_owned()]);
}

#[when("I run the solve command")]
fn run_solve_command(#[from(world)] world: &SolveWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Solve(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_solve_with(args, &QuickSolverBuilder, &mut *buffer)
        }
        Command::Route(_) => panic!("expected solve command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command succeeds and prints JSON output")]
fn command_succeeds_and_prints_json(#[from(world)] world: &SolveWorld) {
    let borrowed = world.result.borrow();
    let result = borrowed.as_ref().expect("result recorded");
    result.as_ref().expect("expected success");

    let response: SolveResponse =
        serde_json::from_slice(&world.stdout.borrow()).expect("output should be a response");
    assert_eq!(response.status, SolveStatus::Solved);
}

#[then("every stop appears in exactly one route")]
fn every_stop_appears_once(#[from(world)] world: &SolveWorld) {
    let response: SolveResponse =
        serde_json::from_slice(&world.stdout.borrow()).expect("output should be a response");
    let mut served: Vec<String> = response.routes.into_values().flatten().collect();
    served.sort_unstable();
    assert_eq!(served, ["a", "b", "c"]);
}

#[then("the command fails because the request JSON is invalid")]
fn command_fails_invalid_json(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::ParseSolveRequest { .. } => {}
        other => panic!("expected ParseSolveRequest, found {other:?}"),
    }
}

#[then("the command fails because the request is invalid")]
fn command_fails_invalid_request(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::InvalidSolveRequest { source, .. } => {
            assert_eq!(*source, SolveRequestValidationError::NoVehicles);
        }
        other => panic!("expected InvalidSolveRequest, found {other:?}"),
    }
}

#[then("the command fails because the request path is missing")]
fn command_fails_missing_request_path(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::MissingArgument { field, .. } => assert_eq!(*field, ARG_SOLVE_REQUEST),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[then("the command fails because the oracle is unknown")]
fn command_fails_unknown_oracle(#[from(world)] world: &SolveWorld) {
    match &*world.error() {
        CliError::InvalidOracle { value } => assert_eq!(value, "teleport"),
        other => panic!("expected InvalidOracle, found {other:?}"),
    }
}

macro_rules! register_solve_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/solve_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: SolveWorld) {
            let _ = world;
        }
    };
}

register_solve_scenario!(solve_happy_path, "solving a request from JSON");
register_solve_scenario!(solve_invalid_json, "rejecting invalid JSON input");
register_solve_scenario!(solve_invalid_request, "rejecting invalid solve requests");
register_solve_scenario!(solve_missing_request, "rejecting missing request paths");
register_solve_scenario!(solve_unknown_oracle, "rejecting unknown oracles");
