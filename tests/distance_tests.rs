use rattend::core::distance::{EARTH_RADIUS_METERS, distance_meters};
use rattend::models::position::GeoPoint;

mod common;
use common::north_of;

#[test]
fn test_distance_identical_points_is_zero() {
    for (lat, lng) in [(40.7128, -74.0060), (0.0, 0.0), (-33.8688, 151.2093), (89.9, 179.9)] {
        let p = GeoPoint::new(lat, lng);
        assert_eq!(distance_meters(p, p), 0.0);
    }
}

#[test]
fn test_distance_is_symmetric() {
    let a = GeoPoint::new(45.4642, 9.19);
    let b = GeoPoint::new(41.9028, 12.4964);
    assert_eq!(distance_meters(a, b), distance_meters(b, a));
}

#[test]
fn test_distance_one_degree_on_equator() {
    let d = distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0));
    assert!((d - 111_195.0).abs() < 111_195.0 * 0.01, "got {d}");
}

#[test]
fn test_distance_antipodal_points_is_half_circumference() {
    let d = distance_meters(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 180.0));
    assert!(!d.is_nan());
    assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
}

#[test]
fn test_distance_north_offset_matches_meters() {
    let base = GeoPoint::new(45.0, 9.0);
    let moved = GeoPoint::new(north_of(45.0, 50.0), 9.0);
    assert!((distance_meters(base, moved) - 50.0).abs() < 1e-6);
}
