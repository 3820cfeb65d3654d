use geo::{Distance, Geodesic, Point};

use super::normalizer::GeoPoint;

/// Geodesic distance on the WGS-84 ellipsoid, in kilometers.
pub fn geodesic_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let origin = Point::new(a.longitude, a.latitude);
    let destination = Point::new(b.longitude, b.latitude);
    Geodesic::distance(origin, destination) / 1000.0
}

/// Sum of the distances between consecutive points. Zero for fewer than two.
pub fn total_distance_km(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|pair| geodesic_km(&pair[0], &pair[1])).sum()
}
