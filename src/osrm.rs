//! OSRM HTTP adapter for travel times.

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::{GeoPoint, TravelTimeProvider};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, from: GeoPoint, to: GeoPoint) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=false",
            self.config.base_url, self.config.profile, from.lng, from.lat, to.lng, to.lat
        )
    }
}

impl TravelTimeProvider for OsrmClient {
    fn name(&self) -> &str {
        "osrm"
    }

    /// OSRM has no notion of departure time; `at` is ignored.
    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        _at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        let url = self.route_url(from, to);
        debug!(%url, "requesting osrm route");

        let body = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())?;

        minutes_from_response(body, from, to)
    }
}

fn minutes_from_response(
    body: OsrmRouteResponse,
    from: GeoPoint,
    to: GeoPoint,
) -> Result<u32, ProviderError> {
    if body.code != "Ok" {
        return Err(ProviderError::NoRoute {
            from: from.key(),
            to: to.key(),
        });
    }
    body.routes
        .first()
        .map(|route| (route.duration / 60.0).floor() as u32)
        .ok_or_else(|| ProviderError::NoRoute {
            from: from.key(),
            to: to.key(),
        })
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Seconds.
    duration: f64,
}
