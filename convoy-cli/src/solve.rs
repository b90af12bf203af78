//! Solve command implementation for the Convoy CLI.

use std::io::{BufReader, Write};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use convoy_core::{SolveRequest, SolveResponse, Solver};
use convoy_fs::open_utf8_file;
use convoy_solver_gls::{DEFAULT_TIME_LIMIT, GlsSolver, GlsSolverConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::oracle::{OracleOptions, OracleSelection};
use crate::{
    ARG_ORACLE, ARG_OSRM_BASE_URL, ARG_OSRM_PROFILE, ARG_OUTPUT, ARG_SOLVE_REQUEST, ARG_SPEED_KMH,
    ARG_TIME_LIMIT_SECS, CliError, ENV_SOLVE_REQUEST, write_json,
};

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Solve a capacitated vehicle routing request with time \
                 windows. The request is a JSON-encoded SolveRequest listing \
                 vehicles and stops; travel times come from the selected \
                 oracle. The response maps each vehicle index to its ordered \
                 stop ids.",
    about = "Solve a fleet routing request"
)]
#[ortho_config(prefix = "CONVOY")]
pub(crate) struct SolveArgs {
    /// Path to a JSON file containing a SolveRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Travel-time oracle: `straight-line` (default) or `osrm`.
    #[arg(long = ARG_ORACLE, value_name = "name")]
    #[serde(default)]
    pub(crate) oracle: Option<String>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM routing profile such as `driving`.
    #[arg(long = ARG_OSRM_PROFILE, value_name = "profile")]
    #[serde(default)]
    pub(crate) osrm_profile: Option<String>,
    /// Average speed for the straight-line oracle.
    #[arg(long = ARG_SPEED_KMH, value_name = "km/h")]
    #[serde(default)]
    pub(crate) speed_kmh: Option<f64>,
    /// Search budget in seconds.
    #[arg(long = ARG_TIME_LIMIT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Write the response here instead of stdout.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Oracle used to build the travel-time matrix.
    pub(crate) oracle: OracleSelection,
    /// Search budget.
    pub(crate) time_limit: Duration,
    /// Optional destination file for the response.
    pub(crate) output: Option<Utf8PathBuf>,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing_file(&self.request_path, ARG_SOLVE_REQUEST)
    }
}

/// Fail unless `path` names an existing regular file.
pub(crate) fn require_existing_file(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match convoy_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_SOLVE_REQUEST,
            env: ENV_SOLVE_REQUEST,
        })?;
        let oracle = OracleSelection::try_from(OracleOptions {
            oracle: args.oracle,
            osrm_base_url: args.osrm_base_url,
            osrm_profile: args.osrm_profile,
            speed_kmh: args.speed_kmh,
        })?;
        let time_limit = args
            .time_limit_secs
            .map_or(DEFAULT_TIME_LIMIT, Duration::from_secs);
        Ok(Self {
            request_path,
            oracle,
            time_limit,
            output: args.output,
        })
    }
}

/// Builds a solver instance for the current solve invocation.
pub(crate) trait SolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError>;
}

/// Guided local search over the configured oracle.
pub(crate) struct DefaultSolverBuilder;

impl SolverBuilder for DefaultSolverBuilder {
    fn build(&self, config: &SolveConfig) -> Result<Box<dyn Solver>, CliError> {
        let oracle = config.oracle.build()?;
        let solver_config = GlsSolverConfig::default().with_time_limit(config.time_limit);
        Ok(Box::new(GlsSolver::with_config(oracle, solver_config)))
    }
}

pub(crate) fn run_solve(args: SolveArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultSolverBuilder, &mut stdout)
}

pub(crate) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn SolverBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_solve_config(args)?;
    let response = execute_solve(&config, builder)?;
    match &config.output {
        Some(path) => write_solve_file(path, &response),
        None => write_json(writer, &response),
    }
}

fn execute_solve(
    config: &SolveConfig,
    builder: &dyn SolverBuilder,
) -> Result<SolveResponse, CliError> {
    let request = load_solve_request(&config.request_path)?;
    request
        .validate()
        .map_err(|source| CliError::InvalidSolveRequest {
            path: config.request_path.clone(),
            source,
        })?;
    let solver = builder.build(config)?;
    solver
        .solve(&request)
        .map_err(|source| CliError::Solve { source })
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`SolveRequest`] from disk.
pub(crate) fn load_solve_request(path: &Utf8Path) -> Result<SolveRequest, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenSolveRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseSolveRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_solve_file(path: &Utf8Path, response: &SolveResponse) -> Result<(), CliError> {
    let mut payload = serde_json::to_vec_pretty(response).map_err(CliError::SerialiseOutput)?;
    payload.push(b'\n');
    convoy_fs::write_utf8(path, &payload).map_err(|source| CliError::WriteOutputFile {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
