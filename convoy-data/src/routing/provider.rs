//! HTTP-based `TravelTimeOracle` using OSRM's Route API.
//!
//! This module provides [`OsrmOracle`], an implementation of the
//! [`TravelTimeOracle`] trait that fetches the fastest path between two
//! coordinates from an OSRM routing service via HTTP.
//!
//! # Architecture
//!
//! The [`TravelTimeOracle`] trait is synchronous to keep the core library
//! embeddable in synchronous contexts. This oracle bridges the async HTTP
//! calls to the sync interface by blocking on a Tokio runtime internally.

use std::time::Duration;

use convoy_core::{OracleError, PathLeg, TravelTimeOracle};
use geo::Coord;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::RouteResponse;

/// Error type for [`OsrmOracle`] construction failures.
#[derive(Debug, Error)]
pub enum OracleBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "convoy-routing/0.1";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Worker threads in the owned runtime. Matrix builds query from many
/// threads at once, so a single-threaded runtime would serialise them.
const RUNTIME_WORKERS: usize = 2;

/// Configuration for [`OsrmOracle`].
#[derive(Debug, Clone)]
pub struct OsrmOracleConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile, such as `"driving"` or `"cycling"`.
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmOracleConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmOracleConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// HTTP-based travel-time oracle using the OSRM Route API.
///
/// This oracle implements the synchronous [`TravelTimeOracle`] trait by
/// internally blocking on asynchronous HTTP requests. It owns a Tokio
/// runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the oracle uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics.
///
/// When called from within a `current_thread` Tokio runtime, the oracle
/// falls back to its own internal runtime. This avoids the panic that
/// `block_in_place` would cause, but may deadlock if the caller's runtime is
/// driving IO or timers that this request depends on.
pub struct OsrmOracle {
    client: Client,
    config: OsrmOracleConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmOracle")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmOracle {
    /// Create a new oracle with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, OracleBuildError> {
        Self::with_config(OsrmOracleConfig::new(base_url))
    }

    /// Create a new oracle with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmOracleConfig) -> Result<Self, OracleBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(OracleBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(RUNTIME_WORKERS)
            .enable_all()
            .build()
            .map_err(OracleBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmOracleConfig {
        &self.config
    }

    /// Build the OSRM Route API URL for one leg.
    ///
    /// The URL format is:
    /// `{base_url}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson`.
    fn build_route_url(&self, from: Coord<f64>, to: Coord<f64>) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.x,
            from.y,
            to.x,
            to.y
        )
    }

    /// Fetch one leg asynchronously.
    async fn fetch_leg_async(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<PathLeg, OracleError> {
        let url = self.build_route_url(from, to);
        log::debug!("querying {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        // OSRM reports routing failures such as `NoRoute` with a 400 status
        // and a JSON body, so the body is preferred over the status line.
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        match serde_json::from_slice::<RouteResponse>(&body) {
            Ok(route_response) => Self::convert_response(route_response, from, to),
            Err(_) if !status.is_success() => Err(OracleError::HttpError {
                url,
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            }),
            Err(err) => Err(OracleError::ParseError {
                message: err.to_string(),
            }),
        }
    }

    /// Convert a reqwest error to an `OracleError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> OracleError {
        if error.is_timeout() {
            return OracleError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return OracleError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        OracleError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }

    /// Convert an OSRM response to a `PathLeg`.
    ///
    /// The fastest route is used. An empty geometry falls back to the two
    /// endpoints.
    fn convert_response(
        response: RouteResponse,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<PathLeg, OracleError> {
        if response.is_no_route() {
            return Err(OracleError::NoRoute);
        }
        if !response.is_ok() {
            return Err(OracleError::ServiceError {
                code: response.code,
                message: response.message.unwrap_or_default(),
            });
        }

        let Some(route) = response.routes.into_iter().next() else {
            return Err(OracleError::NoRoute);
        };
        let duration =
            Duration::try_from_secs_f64(route.duration).map_err(|_| OracleError::ParseError {
                message: format!("invalid route duration {}", route.duration),
            })?;

        let mut polyline: Vec<Coord<f64>> = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Coord { x: lon, y: lat })
            .collect();
        if polyline.is_empty() {
            log::warn!("OSRM returned an empty geometry; using the endpoints");
            polyline = vec![from, to];
        }

        Ok(PathLeg {
            polyline,
            distance_m: route.distance,
            duration,
        })
    }
}

impl TravelTimeOracle for OsrmOracle {
    /// Fetch the fastest path between two coordinates.
    ///
    /// # Runtime requirements
    ///
    /// When called from within an existing Tokio runtime, the runtime must be
    /// multi-threaded (`flavor = "multi_thread"`). Inside a `current_thread`
    /// runtime the method falls back to its own internal runtime, which may
    /// block the caller's runtime.
    fn shortest_path(&self, from: Coord<f64>, to: Coord<f64>) -> Result<PathLeg, OracleError> {
        let future = self.fetch_leg_async(from, to);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::osrm::{Geometry, Route};
    use rstest::{fixture, rstest};

    const FROM: Coord<f64> = Coord { x: -0.1, y: 51.5 };
    const TO: Coord<f64> = Coord { x: -0.2, y: 51.6 };

    #[fixture]
    fn oracle() -> OsrmOracle {
        OsrmOracle::new("http://osrm.example.com").expect("oracle should build")
    }

    fn ok_response(duration: f64, coordinates: Vec<[f64; 2]>) -> RouteResponse {
        RouteResponse {
            code: "Ok".to_owned(),
            message: None,
            routes: vec![Route {
                distance: 1_250.0,
                duration,
                geometry: Geometry { coordinates },
            }],
        }
    }

    #[rstest]
    fn build_route_url_formats_coordinates(oracle: OsrmOracle) {
        assert_eq!(
            oracle.build_route_url(FROM, TO),
            "http://osrm.example.com/route/v1/driving/-0.1,51.5;-0.2,51.6?overview=full&geometries=geojson"
        );
    }

    #[rstest]
    fn build_route_url_strips_trailing_slash_and_uses_profile() {
        let config = OsrmOracleConfig::new("http://osrm.example.com/").with_profile("cycling");
        let oracle = OsrmOracle::with_config(config).expect("oracle should build");

        let url = oracle.build_route_url(FROM, TO);

        assert!(url.starts_with("http://osrm.example.com/route/v1/cycling/"));
        assert!(!url.contains("//route"));
    }

    #[rstest]
    fn convert_response_handles_success() {
        let response = ok_response(240.5, vec![[-0.1, 51.5], [-0.15, 51.55], [-0.2, 51.6]]);

        let leg = OsrmOracle::convert_response(response, FROM, TO).expect("should parse");

        assert_eq!(leg.duration, Duration::from_secs_f64(240.5));
        assert_eq!(leg.distance_m, 1_250.0);
        assert_eq!(leg.polyline.len(), 3);
        assert_eq!(leg.polyline.first(), Some(&FROM));
    }

    #[rstest]
    fn convert_response_falls_back_to_endpoints() {
        let leg = OsrmOracle::convert_response(ok_response(10.0, Vec::new()), FROM, TO)
            .expect("should parse");

        assert_eq!(leg.polyline, vec![FROM, TO]);
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e30)]
    fn convert_response_rejects_invalid_durations(#[case] duration: f64) {
        let err = OsrmOracle::convert_response(ok_response(duration, Vec::new()), FROM, TO)
            .expect_err("should fail");

        assert!(matches!(err, OracleError::ParseError { .. }));
    }

    #[rstest]
    fn convert_response_maps_no_route() {
        let response = RouteResponse {
            code: "NoRoute".to_owned(),
            message: Some("Impossible route between points".to_owned()),
            routes: Vec::new(),
        };

        let err = OsrmOracle::convert_response(response, FROM, TO).expect_err("should fail");

        assert_eq!(err, OracleError::NoRoute);
    }

    #[rstest]
    fn convert_response_maps_empty_routes_to_no_route() {
        let response = RouteResponse {
            code: "Ok".to_owned(),
            message: None,
            routes: Vec::new(),
        };

        let err = OsrmOracle::convert_response(response, FROM, TO).expect_err("should fail");

        assert_eq!(err, OracleError::NoRoute);
    }

    #[rstest]
    fn convert_response_handles_service_error() {
        let response = RouteResponse {
            code: "InvalidQuery".to_owned(),
            message: Some("Query string malformed".to_owned()),
            routes: Vec::new(),
        };

        let err = OsrmOracle::convert_response(response, FROM, TO).expect_err("should fail");

        match err {
            OracleError::ServiceError { code, message } => {
                assert_eq!(code, "InvalidQuery");
                assert_eq!(message, "Query string malformed");
            }
            other => panic!("expected ServiceError, got {other:?}"),
        }
    }

    #[rstest]
    fn unreachable_service_is_a_network_error() {
        let config = OsrmOracleConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
        let oracle = OsrmOracle::with_config(config).expect("oracle should build");

        let err = oracle.shortest_path(FROM, TO).expect_err("nothing listens on port 9");

        assert!(
            matches!(
                err,
                OracleError::NetworkError { .. } | OracleError::Timeout { .. }
            ),
            "got {err:?}"
        );
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = OsrmOracleConfig::new("http://example.com")
            .with_profile("foot")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.profile, "foot");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
