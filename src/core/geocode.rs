//! Nominatim geocoding fallback
//!
//! Resolves a city name to coordinates by querying a Nominatim-compatible
//! search endpoint with `"<name>, Iran"`. Used as an optional fallback for
//! names absent from the local dataset.

use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::core::error::{Error, Result};
use crate::core::router::http_client;

/// Client for a Nominatim-compatible geocoding service
#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
    timeout: Duration,
}

/// Nominatim reports coordinates as strings
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new("https://nominatim.openstreetmap.org")
    }
}

impl Geocoder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Look up `"<city>, Iran"`, returning the first hit's `(lat, lng)`
    pub async fn resolve(&self, city: &str) -> Result<Option<(f64, f64)>> {
        let query = format!("{}, Iran", city);
        debug!("geocoding: {}", query);

        let response = http_client()
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "geocoding service returned {}",
                response.status()
            )));
        }

        let places: Vec<Place> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| Error::Provider(format!("bad latitude '{}': {}", place.lat, e)))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|e| Error::Provider(format!("bad longitude '{}': {}", place.lon, e)))?;

        Ok(Some((lat, lon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_resolve_appends_iran_to_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Yazd, Iran"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": "31.8974", "lon": "54.3569" }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(server.uri());
        let hit = geocoder.resolve("Yazd").await.unwrap();
        assert_eq!(hit, Some((31.8974, 54.3569)));
    }

    #[tokio::test]
    async fn test_resolve_no_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(server.uri());
        assert_eq!(geocoder.resolve("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_bad_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "lat": "north-ish", "lon": "54.3569" }
            ])))
            .mount(&server)
            .await;

        let geocoder = Geocoder::new(server.uri());
        let err = geocoder.resolve("Yazd").await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }
}
