//! OpenStreetMap Nominatim geocoder.

use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::traits::{GeoPoint, Geocoder};

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("dinner-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }
}

impl Geocoder for NominatimClient {
    fn locate(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        debug!(address, "geocoding");
        let places = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<Vec<NominatimPlace>>())?;

        first_point(places, address)
    }
}

fn first_point(places: Vec<NominatimPlace>, address: &str) -> Result<GeoPoint, ProviderError> {
    let place = places
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::AddressNotFound(address.to_string()))?;

    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|_| ProviderError::MalformedResponse(format!("latitude `{}`", place.lat)))?;
    let lng = place
        .lon
        .parse::<f64>()
        .map_err(|_| ProviderError::MalformedResponse(format!("longitude `{}`", place.lon)))?;

    Ok(GeoPoint::new(lat, lng))
}

/// Nominatim reports coordinates as strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}
