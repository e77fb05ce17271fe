//! Hamburg addresses with coordinates, for geography-aware fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use dinner_planner::traits::GeoPoint;

/// A named address with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

// ============================================================================
// Altona / Ottensen
// ============================================================================

pub const ALTONA: &[Location] = &[
    Location::new("Ottensen Markt", "Ottenser Hauptstraße 10, 22765 Hamburg", 53.5520, 9.9292),
    Location::new("Altonaer Balkon", "Klopstockstraße 1, 22765 Hamburg", 53.5455, 9.9353),
    Location::new("Bahrenfeld", "Bahrenfelder Chaussee 49, 22761 Hamburg", 53.5640, 9.9090),
];

// ============================================================================
// St. Pauli / Neustadt
// ============================================================================

pub const CENTER: &[Location] = &[
    Location::new("Rathaus", "Rathausmarkt 1, 20095 Hamburg", 53.5503, 9.9925),
    Location::new("Michel", "Englische Planke 1, 20459 Hamburg", 53.5484, 9.9788),
    Location::new("Schanze", "Schulterblatt 58, 20357 Hamburg", 53.5620, 9.9622),
];

// ============================================================================
// Eimsbüttel
// ============================================================================

pub const EIMSBUETTEL: &[Location] = &[
    Location::new("Osterstraße", "Osterstraße 120, 20255 Hamburg", 53.5752, 9.9540),
    Location::new("Hoheluft", "Hoheluftchaussee 20, 20253 Hamburg", 53.5800, 9.9770),
    Location::new("Eppendorf", "Eppendorfer Baum 12, 20249 Hamburg", 53.5843, 9.9847),
];

/// Nine distinct addresses spread over three districts.
pub fn all_locations() -> Vec<&'static Location> {
    ALTONA.iter().chain(CENTER).chain(EIMSBUETTEL).collect()
}
