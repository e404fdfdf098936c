//! Route geometry construction and distance math.
//!
//! A route's path is an ordered polyline of `(lon, lat)` vertices built
//! from its GPS samples. Segment lengths use the haversine great-circle
//! distance; point-to-segment distance projects onto a local tangent plane
//! centered on the query point, which is accurate to well under a meter at
//! the buffer scales involved here.

mod bbox;

pub use bbox::BoundingBox;

use geo::{Distance, Haversine, Point};

use crate::config::EARTH_RADIUS_METERS;
use crate::error_handling::GeometryError;

/// Minimal view of a GPS sample needed to build geometry.
///
/// Samples missing either coordinate are skipped during construction.
#[derive(Debug, Clone, Copy)]
pub struct SampleCoord {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// An ordered route polyline with its precomputed geodesic length.
///
/// Built once per enrichment run and treated as immutable afterwards.
#[derive(Debug, Clone)]
pub struct RouteGeometry {
    path: Vec<Point<f64>>,
    total_length_meters: f64,
}

impl RouteGeometry {
    /// Builds a path from samples already ordered by `(timestamp, id)`.
    ///
    /// Samples missing a latitude or longitude are skipped. A single usable
    /// sample yields a degenerate one-vertex path with length zero.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidGeometry`] when no usable sample
    /// remains.
    pub fn from_samples(samples: &[SampleCoord]) -> Result<Self, GeometryError> {
        let path: Vec<Point<f64>> = samples
            .iter()
            .filter_map(|s| match (s.longitude, s.latitude) {
                (Some(lon), Some(lat)) => Some(Point::new(lon, lat)),
                _ => None,
            })
            .collect();

        if path.is_empty() {
            return Err(GeometryError::InvalidGeometry);
        }

        let total_length_meters = path
            .windows(2)
            .map(|pair| Haversine::distance(pair[0], pair[1]))
            .sum();

        Ok(Self {
            path,
            total_length_meters,
        })
    }

    /// Ordered `(lon, lat)` vertices.
    pub fn path(&self) -> &[Point<f64>] {
        &self.path
    }

    /// Sum of consecutive geodesic segment lengths in meters.
    pub fn total_length_meters(&self) -> f64 {
        self.total_length_meters
    }

    pub fn vertex_count(&self) -> usize {
        self.path.len()
    }

    /// Axis-aligned bounding box of the path expanded by `buffer_meters`.
    pub fn buffered_bbox(&self, buffer_meters: f64) -> BoundingBox {
        BoundingBox::around(&self.path, buffer_meters)
    }

    /// Precise minimum distance in meters from a point to the path.
    ///
    /// This is the final inclusion test for candidates; the bounding box is
    /// only a loose pre-filter. Distance to a one-vertex path is the plain
    /// haversine point distance.
    pub fn distance_to(&self, lon: f64, lat: f64) -> f64 {
        let point = Point::new(lon, lat);
        if self.path.len() == 1 {
            return Haversine::distance(point, self.path[0]);
        }
        self.path
            .windows(2)
            .map(|seg| point_to_segment_meters(point, seg[0], seg[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Longitude difference normalized to [-180, 180] degrees.
fn lon_delta(from: f64, to: f64) -> f64 {
    let mut d = to - from;
    if d > 180.0 {
        d -= 360.0;
    } else if d < -180.0 {
        d += 360.0;
    }
    d
}

/// Distance in meters from `point` to the segment `a`-`b`.
///
/// Projects both endpoints onto a tangent plane centered on `point`
/// (equirectangular, scaled by the cosine of the point's latitude), then
/// applies the standard clamped point-to-segment projection in the plane.
fn point_to_segment_meters(point: Point<f64>, a: Point<f64>, b: Point<f64>) -> f64 {
    let lat_scale = point.y().to_radians().cos();
    let to_plane = |q: Point<f64>| -> (f64, f64) {
        let x = lon_delta(point.x(), q.x()).to_radians() * lat_scale * EARTH_RADIUS_METERS;
        let y = (q.y() - point.y()).to_radians() * EARTH_RADIUS_METERS;
        (x, y)
    };

    let (ax, ay) = to_plane(a);
    let (bx, by) = to_plane(b);
    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;

    // Degenerate segment: both endpoints at the same location.
    if len2 < 1e-12 {
        return Haversine::distance(point, a);
    }

    // The query point sits at the plane origin.
    let t = ((-ax * dx) + (-ay * dy)) / len2;
    let t = t.clamp(0.0, 1.0);
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    (cx * cx + cy * cy).sqrt()
}
