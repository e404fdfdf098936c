//! Buffered bounding boxes.

use geo::Point;
use serde::Serialize;

use crate::config::{MAX_BBOX_LATITUDE, METERS_PER_DEGREE_LAT};

/// Axis-aligned bounding box in degrees.
///
/// The box produced by [`BoundingBox::around`] is intentionally looser than
/// the true geodesic buffer: it is the cheap provider pre-filter, never the
/// final inclusion test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Bounding box of `path` expanded by `buffer_meters` on every side.
    ///
    /// Latitude padding converts meters to degrees directly; longitude
    /// padding divides by the smallest cosine of latitude inside the box,
    /// so the expansion only ever over-covers. The guarantee is that every
    /// point within `buffer_meters` of the path lies inside the box.
    pub fn around(path: &[Point<f64>], buffer_meters: f64) -> Self {
        debug_assert!(!path.is_empty());

        let mut min_lon = f64::INFINITY;
        let mut min_lat = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        for p in path {
            min_lon = min_lon.min(p.x());
            max_lon = max_lon.max(p.x());
            min_lat = min_lat.min(p.y());
            max_lat = max_lat.max(p.y());
        }

        let lat_pad = buffer_meters / METERS_PER_DEGREE_LAT;

        // Worst-case latitude after padding, clamped away from the poles
        // where the cosine degenerates.
        let extreme_lat = (min_lat - lat_pad)
            .abs()
            .max((max_lat + lat_pad).abs())
            .min(MAX_BBOX_LATITUDE);
        let lon_pad = buffer_meters / (METERS_PER_DEGREE_LAT * extreme_lat.to_radians().cos());

        Self {
            min_lon: min_lon - lon_pad,
            min_lat: min_lat - lat_pad,
            max_lon: max_lon + lon_pad,
            max_lat: max_lat + lat_pad,
        }
    }

    /// Whether a coordinate falls inside the box (edges inclusive).
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}
