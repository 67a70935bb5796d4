use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Below this absolute value on both axes a fix is treated as "null island" (0,0).
pub const NULL_ISLAND_EPSILON: f64 = 1e-4;

/// A bare geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Latitude within [-90, 90], longitude within [-180, 180], both finite.
    pub fn is_in_range(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn is_null_island(&self) -> bool {
        self.lat.abs() < NULL_ISLAND_EPSILON && self.lng.abs() < NULL_ISLAND_EPSILON
    }
}

/// A position sample as delivered by the geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    pub captured_at: DateTime<Utc>,
}

impl Position {
    pub fn new(lat: f64, lng: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            lat,
            lng,
            captured_at,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Age of the sample relative to `now` (never negative).
    pub fn age(&self, now: DateTime<Utc>) -> chrono::TimeDelta {
        (now - self.captured_at).max(chrono::TimeDelta::zero())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.point().fmt(f)
    }
}
