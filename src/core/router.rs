//! Route providers
//!
//! Two interchangeable strategies behind one capability: given two coordinate
//! pairs, produce a driving route with distance, duration and path. The OSRM
//! strategy calls an external routing service; the placeholder strategy
//! returns a straight two-point path with fixed constants for setups without
//! a live routing integration.

use std::time::Duration;

use log::debug;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};

use crate::core::error::{Error, Result};

/// Distance reported by the placeholder strategy, in kilometers
pub const PLACEHOLDER_DISTANCE_KM: f64 = 870.0;

/// Duration reported by the placeholder strategy, in hours
pub const PLACEHOLDER_DURATION_HOURS: f64 = 9.5;

/// Global HTTP client shared by all outbound provider calls
static GLOBAL_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .tcp_keepalive(Duration::from_secs(60))
        .pool_idle_timeout(Duration::from_secs(90))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(format!("rahyab/{}", env!("RAHYAB_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

pub(crate) fn http_client() -> &'static Client {
    &GLOBAL_CLIENT
}

/// A computed driving route
///
/// `distance` is in kilometers and `duration` in hours, both rounded to two
/// decimals. `coordinates` is the path as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub coordinates: Vec<[f64; 2]>,
    pub distance: f64,
    pub duration: f64,
}

/// Configuration for the external routing service
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Base URL of an OSRM-compatible routing service
    pub base_url: String,

    /// Deadline for a single routing request
    pub timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Routing strategy selected by configuration
#[derive(Debug, Clone)]
pub enum RouterBackend {
    /// Live OSRM-compatible routing service
    Osrm(OsrmRouter),

    /// Straight two-point path with fixed distance and duration constants
    Placeholder,
}

impl RouterBackend {
    pub fn osrm(config: RouterConfig) -> Self {
        Self::Osrm(OsrmRouter::new(config))
    }

    /// Compute a route between two `(lat, lng)` pairs
    pub async fn route(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteSummary> {
        match self {
            Self::Osrm(router) => router.route(from, to).await,
            Self::Placeholder => Ok(RouteSummary {
                coordinates: vec![[from.0, from.1], [to.0, to.1]],
                distance: PLACEHOLDER_DISTANCE_KM,
                duration: PLACEHOLDER_DURATION_HOURS,
            }),
        }
    }
}

/// Client for an OSRM-compatible driving-route service
#[derive(Debug, Clone)]
pub struct OsrmRouter {
    config: RouterConfig,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters
    distance: f64,
    /// Seconds
    duration: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[lng, lat]` points along the route
    coordinates: Vec<[f64; 2]>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl OsrmRouter {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Request a driving route and take the first candidate
    pub async fn route(&self, from: (f64, f64), to: (f64, f64)) -> Result<RouteSummary> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            self.config.base_url, from.1, from.0, to.1, to.0
        );
        debug!("requesting route: {}", url);

        let response = http_client()
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "routing service returned {}",
                response.status()
            )));
        }

        let body: OsrmResponse = response.json().await?;
        let route = body.routes.into_iter().next().ok_or(Error::RouteNotFound)?;

        Ok(RouteSummary {
            coordinates: route.geometry.coordinates,
            distance: round2(route.distance / 1000.0),
            duration: round2(route.duration / 3600.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEHRAN: (f64, f64) = (35.6892, 51.389);
    const SHIRAZ: (f64, f64) = (29.5918, 52.5837);

    fn osrm_backend(base_url: String, timeout: Duration) -> RouterBackend {
        RouterBackend::osrm(RouterConfig { base_url, timeout })
    }

    #[tokio::test]
    async fn test_placeholder_route() {
        let backend = RouterBackend::Placeholder;
        let summary = backend.route(TEHRAN, SHIRAZ).await.unwrap();

        assert_eq!(
            summary.coordinates,
            vec![[35.6892, 51.389], [29.5918, 52.5837]]
        );
        assert_eq!(summary.distance, 870.0);
        assert_eq!(summary.duration, 9.5);
    }

    #[tokio::test]
    async fn test_osrm_route_conversion_and_rounding() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/route/v1/driving/.+"))
            .and(query_param("overview", "full"))
            .and(query_param("geometries", "geojson"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "routes": [{
                    "distance": 919_456.0,
                    "duration": 34_567.0,
                    "geometry": {
                        "coordinates": [[51.389, 35.6892], [52.0, 32.0], [52.5837, 29.5918]]
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let backend = osrm_backend(server.uri(), Duration::from_secs(10));
        let summary = backend.route(TEHRAN, SHIRAZ).await.unwrap();

        assert_eq!(summary.distance, 919.46); // meters -> km, 2 decimals
        assert_eq!(summary.duration, 9.6); // seconds -> hours, 2 decimals
        assert_eq!(summary.coordinates.len(), 3);
        assert_eq!(summary.coordinates[0], [51.389, 35.6892]);
    }

    #[tokio::test]
    async fn test_osrm_no_routes_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/route/v1/driving/.+"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "routes": [] })))
            .mount(&server)
            .await;

        let backend = osrm_backend(server.uri(), Duration::from_secs(10));
        let err = backend.route(TEHRAN, SHIRAZ).await.unwrap_err();
        assert!(matches!(err, Error::RouteNotFound));
    }

    #[tokio::test]
    async fn test_osrm_server_error_is_provider_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/route/v1/driving/.+"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = osrm_backend(server.uri(), Duration::from_secs(10));
        let err = backend.route(TEHRAN, SHIRAZ).await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_osrm_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/route/v1/driving/.+"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "routes": [] }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let backend = osrm_backend(server.uri(), Duration::from_millis(200));
        let err = backend.route(TEHRAN, SHIRAZ).await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn test_osrm_url_places_longitude_first() {
        let config = RouterConfig {
            base_url: "http://example.test".to_string(),
            ..Default::default()
        };
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
            config.base_url, TEHRAN.1, TEHRAN.0, SHIRAZ.1, SHIRAZ.0
        );
        assert_eq!(
            url,
            "http://example.test/route/v1/driving/51.389,35.6892;52.5837,29.5918?overview=full&geometries=geojson"
        );
    }
}
