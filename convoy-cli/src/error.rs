//! Error types emitted by the Convoy CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use convoy_core::{InvalidSpeedError, OracleError, SolveError, SolveRequestValidationError};
use convoy_data::routing::OracleBuildError;
use thiserror::Error;

/// Errors emitted by the Convoy CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (pass it on the command line or set {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The oracle name is not one the CLI knows.
    #[error("unknown oracle {value:?} (expected `straight-line` or `osrm`)")]
    InvalidOracle { value: String },
    /// The straight-line speed was rejected.
    #[error(transparent)]
    InvalidSpeed(#[from] InvalidSpeedError),
    /// A coordinate argument was not `LAT,LON` in WGS84 range.
    #[error("{field} must be `LAT,LON` in WGS84 degrees, got {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },
    /// Constructing the OSRM oracle failed.
    #[error("failed to build OSRM oracle for {base_url:?}: {source}")]
    BuildOracle {
        base_url: String,
        #[source]
        source: OracleBuildError,
    },
    /// Opening the solve request file failed.
    #[error("failed to open solve request at {path:?}: {source}")]
    OpenSolveRequest {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Solve request JSON could not be decoded.
    #[error("failed to parse solve request JSON at {path:?}: {source}")]
    ParseSolveRequest {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The solve request payload failed validation.
    #[error("solve request in {path:?} failed validation: {source}")]
    InvalidSolveRequest {
        path: Utf8PathBuf,
        #[source]
        source: SolveRequestValidationError,
    },
    /// The solver failed.
    #[error("solve failed: {source}")]
    Solve {
        #[source]
        source: SolveError,
    },
    /// The oracle could not route between the two points.
    #[error("route lookup failed: {source}")]
    Route {
        #[source]
        source: OracleError,
    },
    /// Command output could not be encoded as JSON.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing command output to a file failed.
    #[error("failed to write output to {path:?}: {source}")]
    WriteOutputFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
