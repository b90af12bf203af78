//! Oracle selection shared by the `solve` and `route` subcommands.

use convoy_core::{DEFAULT_SPEED_KMH, StraightLineOracle, TravelTimeOracle};
use convoy_data::routing::{OsrmOracle, OsrmOracleConfig};

use crate::CliError;

/// Name accepted by `--oracle` for great-circle travel times.
pub(crate) const ORACLE_STRAIGHT_LINE: &str = "straight-line";
/// Name accepted by `--oracle` for an OSRM server.
pub(crate) const ORACLE_OSRM: &str = "osrm";

/// An oracle that can be shared across the matrix builder's worker threads.
pub(crate) type BoxedOracle = Box<dyn TravelTimeOracle + Send + Sync>;

/// The oracle a command will query, resolved from layered options.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OracleSelection {
    /// Great-circle distance at a constant speed.
    StraightLine(StraightLineOracle),
    /// A remote OSRM route service.
    Osrm { base_url: String, profile: String },
}

/// Raw oracle options as merged from flags, environment and files.
#[derive(Debug, Clone, Default)]
pub(crate) struct OracleOptions {
    pub(crate) oracle: Option<String>,
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) osrm_profile: Option<String>,
    pub(crate) speed_kmh: Option<f64>,
}

impl TryFrom<OracleOptions> for OracleSelection {
    type Error = CliError;

    fn try_from(options: OracleOptions) -> Result<Self, Self::Error> {
        let name = options
            .oracle
            .as_deref()
            .map_or(ORACLE_STRAIGHT_LINE, str::trim)
            .to_ascii_lowercase();
        match name.as_str() {
            ORACLE_STRAIGHT_LINE => {
                let speed = options.speed_kmh.unwrap_or(DEFAULT_SPEED_KMH);
                Ok(Self::StraightLine(StraightLineOracle::with_speed_kmh(speed)?))
            }
            ORACLE_OSRM => {
                let defaults = OsrmOracleConfig::default();
                Ok(Self::Osrm {
                    base_url: options.osrm_base_url.unwrap_or(defaults.base_url),
                    profile: options.osrm_profile.unwrap_or(defaults.profile),
                })
            }
            _ => Err(CliError::InvalidOracle {
                value: options.oracle.unwrap_or_default(),
            }),
        }
    }
}

impl OracleSelection {
    /// Construct the selected oracle.
    pub(crate) fn build(&self) -> Result<BoxedOracle, CliError> {
        match self {
            Self::StraightLine(oracle) => Ok(Box::new(*oracle)),
            Self::Osrm { base_url, profile } => {
                let config = OsrmOracleConfig::new(base_url.clone()).with_profile(profile.clone());
                let oracle =
                    OsrmOracle::with_config(config).map_err(|source| CliError::BuildOracle {
                        base_url: base_url.clone(),
                        source,
                    })?;
                Ok(Box::new(oracle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None)]
    #[case(Some("straight-line"))]
    #[case(Some(" Straight-Line "))]
    fn straight_line_is_the_default(#[case] name: Option<&str>) {
        let selection = OracleSelection::try_from(OracleOptions {
            oracle: name.map(str::to_owned),
            ..OracleOptions::default()
        })
        .expect("valid selection");
        assert_eq!(
            selection,
            OracleSelection::StraightLine(StraightLineOracle::default())
        );
    }

    #[rstest]
    fn osrm_falls_back_to_default_endpoint() {
        let selection = OracleSelection::try_from(OracleOptions {
            oracle: Some("osrm".to_owned()),
            osrm_profile: Some("cycling".to_owned()),
            ..OracleOptions::default()
        })
        .expect("valid selection");
        assert_eq!(
            selection,
            OracleSelection::Osrm {
                base_url: OsrmOracleConfig::default().base_url,
                profile: "cycling".to_owned(),
            }
        );
    }

    #[rstest]
    fn unknown_oracles_are_rejected() {
        let err = OracleSelection::try_from(OracleOptions {
            oracle: Some("teleport".to_owned()),
            ..OracleOptions::default()
        })
        .expect_err("unknown oracle");
        assert!(matches!(err, CliError::InvalidOracle { value } if value == "teleport"));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    fn unusable_speeds_are_rejected(#[case] speed: f64) {
        let err = OracleSelection::try_from(OracleOptions {
            speed_kmh: Some(speed),
            ..OracleOptions::default()
        })
        .expect_err("invalid speed");
        assert!(matches!(err, CliError::InvalidSpeed(_)));
    }

    #[rstest]
    fn osrm_selection_builds_without_contacting_the_server() {
        let selection = OracleSelection::Osrm {
            base_url: "http://127.0.0.1:9".to_owned(),
            profile: "driving".to_owned(),
        };
        assert!(selection.build().is_ok());
    }
}
