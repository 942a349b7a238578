//! # GeoIndex
//!
//! Great-circle distance and radius containment. Haversine over raw
//! Euclidean difference so the math stays honest near the poles and
//! across the antimeridian.

use domains::GeoPoint;

/// Mean Earth radius in meters (IUGG).
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
pub fn haversine_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp before asin: floating error can push h a hair past 1.0 for
    // antipodal points.
    let h = h.min(1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// True iff `point` lies strictly inside the circle around `center`.
/// The boundary is exclusive: a point at exactly `radius_meters` is out.
pub fn within_radius(point: GeoPoint, center: GeoPoint, radius_meters: f64) -> bool {
    haversine_meters(point, center) < radius_meters
}
