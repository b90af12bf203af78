//! OSRM API response types for the Route service.
//!
//! The Route API finds the fastest route between the supplied coordinates.
//! Requests ask for `geometries=geojson` so the geometry arrives as plain
//! `[lon, lat]` pairs rather than an encoded polyline.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// The response carries alternative routes on success or an error message on
/// failure. The `code` field indicates the response status.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidValue"` - A parameter value is out of range
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Routes found, fastest first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }

    /// Check if the service found no route between the coordinates.
    #[must_use]
    pub fn is_no_route(&self) -> bool {
        self.code == "NoRoute"
    }
}

/// One route in a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Route length in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: f64,
    /// Route geometry in GeoJSON form.
    pub geometry: Geometry,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[lon, lat]` pairs along the route.
    pub coordinates: Vec<[f64; 2]>,
}
