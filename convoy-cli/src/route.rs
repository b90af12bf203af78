//! Route command: query the oracle for a single leg.

use std::io::Write;

use clap::Parser;
use convoy_core::{Location, PathLeg};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::oracle::{BoxedOracle, OracleOptions, OracleSelection};
use crate::{
    ARG_ORACLE, ARG_OSRM_BASE_URL, ARG_OSRM_PROFILE, ARG_ROUTE_FROM, ARG_ROUTE_TO, ARG_SPEED_KMH,
    CliError, ENV_ROUTE_FROM, ENV_ROUTE_TO, write_json,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Ask the selected oracle for the path between two points \
                 and print its polyline, length in metres and travel time in \
                 seconds as JSON.",
    about = "Look up a single route between two coordinates"
)]
#[ortho_config(prefix = "CONVOY")]
pub(crate) struct RouteArgs {
    /// Origin as `LAT,LON`.
    #[arg(long = ARG_ROUTE_FROM, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) from: Option<String>,
    /// Destination as `LAT,LON`.
    #[arg(long = ARG_ROUTE_TO, value_name = "lat,lon", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) to: Option<String>,
    /// Travel-time oracle: `straight-line` (default) or `osrm`.
    #[arg(long = ARG_ORACLE, value_name = "name")]
    #[serde(default)]
    pub(crate) oracle: Option<String>,
    /// Base URL for the OSRM server.
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
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RouteConfig {
    pub(crate) from: Location,
    pub(crate) to: Location,
    pub(crate) oracle: OracleSelection,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let from = required_location(args.from, ARG_ROUTE_FROM, ENV_ROUTE_FROM)?;
        let to = required_location(args.to, ARG_ROUTE_TO, ENV_ROUTE_TO)?;
        let oracle = OracleSelection::try_from(OracleOptions {
            oracle: args.oracle,
            osrm_base_url: args.osrm_base_url,
            osrm_profile: args.osrm_profile,
            speed_kmh: args.speed_kmh,
        })?;
        Ok(Self { from, to, oracle })
    }
}

fn required_location(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<Location, CliError> {
    let raw = value.ok_or(CliError::MissingArgument { field, env })?;
    parse_location(&raw).ok_or(CliError::InvalidCoordinate { field, value: raw })
}

/// Parse `LAT,LON`, rejecting values outside the WGS84 range.
pub(crate) fn parse_location(raw: &str) -> Option<Location> {
    let (lat, lon) = raw.split_once(',')?;
    let location = Location::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?);
    location.is_valid().then_some(location)
}

/// JSON body printed by `convoy route`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RouteOutput {
    /// Points along the path, origin first.
    pub(crate) polyline: Vec<Location>,
    /// Path length in metres.
    pub(crate) distance_m: f64,
    /// Travel time in seconds.
    pub(crate) travel_time_s: f64,
}

impl From<PathLeg> for RouteOutput {
    fn from(leg: PathLeg) -> Self {
        Self {
            polyline: leg.polyline.into_iter().map(Location::from).collect(),
            distance_m: leg.distance_m,
            travel_time_s: leg.duration.as_secs_f64(),
        }
    }
}

/// Builds the oracle for one route lookup.
pub(crate) trait OracleBuilder {
    fn build(&self, config: &RouteConfig) -> Result<BoxedOracle, CliError>;
}

pub(crate) struct DefaultOracleBuilder;

impl OracleBuilder for DefaultOracleBuilder {
    fn build(&self, config: &RouteConfig) -> Result<BoxedOracle, CliError> {
        config.oracle.build()
    }
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &DefaultOracleBuilder, &mut stdout)
}

pub(crate) fn run_route_with(
    args: RouteArgs,
    builder: &dyn OracleBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let oracle = builder.build(&config)?;
    let leg = oracle
        .shortest_path(config.from.to_coord(), config.to.to_coord())
        .map_err(|source| CliError::Route { source })?;
    write_json(writer, &RouteOutput::from(leg))
}
