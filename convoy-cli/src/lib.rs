//! Command-line interface for the Convoy fleet routing engine.
//!
//! `convoy solve` reads a JSON `SolveRequest`, builds a travel-time matrix
//! with the selected oracle and prints the solver's response. `convoy route`
//! prints a single oracle leg. Options are layered from flags, `CONVOY_*`
//! environment variables and configuration files via `ortho_config`.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Serialize;

mod error;
mod oracle;
mod route;
mod solve;

pub use error::CliError;

use route::{RouteArgs, run_route};
use solve::{SolveArgs, run_solve};

pub(crate) const ARG_SOLVE_REQUEST: &str = "request";
pub(crate) const ARG_ORACLE: &str = "oracle";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_OSRM_PROFILE: &str = "osrm-profile";
pub(crate) const ARG_SPEED_KMH: &str = "speed-kmh";
pub(crate) const ARG_TIME_LIMIT_SECS: &str = "time-limit-secs";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_ROUTE_FROM: &str = "from";
pub(crate) const ARG_ROUTE_TO: &str = "to";
pub(crate) const ENV_SOLVE_REQUEST: &str = "CONVOY_REQUEST_PATH";
pub(crate) const ENV_ROUTE_FROM: &str = "CONVOY_FROM";
pub(crate) const ENV_ROUTE_TO: &str = "CONVOY_TO";

/// Run the Convoy CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns a [`CliError`] describing the first failure.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => run_solve(args),
        Command::Route(args) => run_route(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "convoy",
    about = "Fleet routing with capacities and time windows",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve a JSON routing request and print the assigned routes.
    Solve(SolveArgs),
    /// Print the oracle's path between two coordinates.
    Route(RouteArgs),
}

/// Pretty-print `value` as JSON followed by a newline.
pub(crate) fn write_json<T: Serialize>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
