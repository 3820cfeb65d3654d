// Location Sequence Module
// Time-ordered view over every point of an export.

use super::distance::total_distance_km;
use super::normalizer::GeoPoint;

/// Holds a sorted collection of `GeoPoint` instances.
#[derive(Debug, Default, Clone)]
pub struct LocationSequence {
    /// Guaranteed to be sorted by `timestamp`; equal timestamps keep their
    /// extraction order.
    points: Vec<GeoPoint>,
}

impl LocationSequence {
    pub fn from_points(mut points: Vec<GeoPoint>) -> Self {
        // Stable sort: ties must keep their extraction order.
        points.sort_by_key(|p| p.timestamp);
        LocationSequence { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }

    pub fn head(&self, rows: usize) -> &[GeoPoint] {
        &self.points[..rows.min(self.points.len())]
    }

    /// Mean latitude and longitude, `None` for an empty sequence.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }

        let n = self.points.len() as f64;
        let (lat, lon) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(lat, lon), p| (lat + p.latitude, lon + p.longitude));
        Some((lat / n, lon / n))
    }

    pub fn total_distance_km(&self) -> f64 {
        total_distance_km(&self.points)
    }
}

impl<'a> IntoIterator for &'a LocationSequence {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
