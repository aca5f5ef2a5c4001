//! Great-circle helpers

use geo::HaversineDistance;

use crate::core::types::GeoPoint;

/// Great-circle distance in metres
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    a.to_point().haversine_distance(&b.to_point())
}

/// Point on the unit sphere
///
/// Straight-line (chord) distance between two of these grows strictly with
/// the great-circle distance between the original points, so a Euclidean
/// nearest-neighbour search over them finds the great-circle nearest.
pub fn unit_vector(p: GeoPoint) -> [f64; 3] {
    let lat = p.lat.to_radians();
    let lon = p.lon.to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}
