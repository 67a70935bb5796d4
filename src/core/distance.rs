//! Great-circle distance on a spherical Earth.

use crate::models::position::GeoPoint;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

fn to_radians(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}

/// Haversine distance between two points, in meters.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = to_radians(a.lat);
    let lat2 = to_radians(b.lat);
    let dlat = to_radians(b.lat - a.lat);
    let dlng = to_radians(b.lng - a.lng);

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // rounding can push h a hair above 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}
