//! OSRM HTTP adapter for walking directions.

use serde::Deserialize;
use tracing::debug;

use crate::error::DirectionsError;
use crate::polyline::Polyline;
use crate::schedule::Coordinate;
use crate::traits::WalkingDirectionsProvider;

/// OSRM's `geometries=polyline` uses five decimal digits.
const GEOMETRY_PRECISION: u32 = 5;

/// Connection settings for an `osrm-routed` instance.
#[derive(Debug, Clone)]
pub struct OsrmConfig {
    /// Server root, e.g. `http://localhost:5000`. A trailing slash is ignored.
    pub base_url: String,
    /// Routing profile in the URL path. The server must have been prepared
    /// with the matching Lua profile (`foot` for walking).
    pub profile: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "foot".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Walking directions from OSRM's `/route` service.
///
/// Each lookup is one blocking GET. `NoRoute` and `NoSegment` answers become
/// `Ok(None)`; other service codes surface as [`DirectionsError::Service`].
#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    /// Builds the HTTP client. Fails only if reqwest cannot set up TLS or the
    /// connection pool.
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, from: Coordinate, to: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            from.longitude,
            from.latitude,
            to.longitude,
            to.latitude,
        )
    }
}

impl WalkingDirectionsProvider for OsrmClient {
    fn walking_path(
        &self,
        from: Coordinate,
        to: Coordinate,
    ) -> Result<Option<Polyline>, DirectionsError> {
        let url = self.route_url(from, to);
        debug!(%url, "requesting walking route");

        // OSRM answers NoRoute with a 400, so the body is read before the status.
        let response = self.client.get(url).send()?;
        let status = response.status();
        let body = match response.json::<OsrmRouteResponse>() {
            Ok(body) => body,
            Err(err) if status.is_success() => return Err(err.into()),
            Err(_) => {
                return Err(DirectionsError::Service {
                    code: status.as_u16().to_string(),
                    message: status.canonical_reason().unwrap_or("unexpected status").to_string(),
                })
            }
        };

        interpret(body)
    }
}

fn interpret(body: OsrmRouteResponse) -> Result<Option<Polyline>, DirectionsError> {
    match body.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Ok(None),
        _ => {
            return Err(DirectionsError::Service {
                code: body.code,
                message: body.message.unwrap_or_default(),
            })
        }
    }

    let Some(route) = body.routes.into_iter().next() else {
        return Ok(None);
    };
    let polyline = Polyline::decode(&route.geometry, GEOMETRY_PRECISION)?;
    if polyline.len() < 2 {
        return Ok(None);
    }
    Ok(Some(polyline))
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}
