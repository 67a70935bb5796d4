use super::position::GeoPoint;
use serde::{Deserialize, Serialize};

/// A company-owned work location. Sites are never deleted, only relocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl Site {
    pub fn new(id: impl Into<String>, name: impl Into<String>, at: GeoPoint) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat: at.lat,
            lng: at.lng,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn relocate(&mut self, to: GeoPoint) {
        self.lat = to.lat;
        self.lng = to.lng;
    }
}
