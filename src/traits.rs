//! Collaborator interfaces for the dinner planner.
//!
//! The model core never talks to the network. Everything it needs about
//! geography arrives through these two capabilities, and any backend
//! (road routing, transit routing, straight-line estimate) can implement them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A geocoded location (WGS84 degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Stable textual key, used for cache lookups.
    pub fn key(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Resolves a postal address into a point.
pub trait Geocoder {
    fn locate(&self, address: &str) -> Result<GeoPoint, ProviderError>;
}

/// Supplies travel durations in whole minutes.
///
/// Implementations must be deterministic for a fixed input tuple and must
/// fail instead of guessing when a route cannot be resolved.
pub trait TravelTimeProvider {
    /// Human readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Travel time from `from` to `to` when arriving for a course starting at `at`.
    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError>;

    /// Travel time from `from` to the afterparty location.
    fn duration_to_afterparty(
        &self,
        from: GeoPoint,
        afterparty: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        self.duration_between(from, afterparty, at)
    }
}

impl<P: TravelTimeProvider + ?Sized> TravelTimeProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        (**self).duration_between(from, to, at)
    }

    fn duration_to_afterparty(
        &self,
        from: GeoPoint,
        afterparty: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        (**self).duration_to_afterparty(from, afterparty, at)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn locate(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        (**self).locate(address)
    }
}
