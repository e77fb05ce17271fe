//! Straight-line travel time estimate (fallback when no router is available).
//!
//! Uses great-circle distance and an assumed average speed. Ignores roads
//! and timetables, so it underestimates real trips, but it is always
//! available and fully deterministic.

use chrono::NaiveDateTime;

use crate::error::ProviderError;
use crate::traits::{GeoPoint, TravelTimeProvider};

/// Average cycling speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 15.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based travel time provider.
#[derive(Debug, Clone)]
pub struct StraightLine {
    /// Assumed average travel speed in km/h.
    pub speed_kmh: f64,
}

impl Default for StraightLine {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl StraightLine {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Great-circle distance between two points in kilometers.
    pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Convert distance in km to whole travel minutes.
    fn km_to_minutes(&self, km: f64) -> u32 {
        let hours = km / self.speed_kmh;
        (hours * 60.0).round() as u32
    }
}

impl TravelTimeProvider for StraightLine {
    fn name(&self) -> &str {
        "straight-line"
    }

    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        _at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        Ok(self.km_to_minutes(Self::haversine_km(from, to)))
    }
}
