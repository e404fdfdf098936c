//! Proximity matching.
//!
//! Candidates arrive pre-filtered by the provider bounding box, which is
//! deliberately looser than the true buffer. The matcher re-validates each
//! one against the precise point-to-path distance and associates the
//! survivors with the route.

use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::geometry::RouteGeometry;
use crate::storage::{upsert_association, AssociationWrite};

/// Outcome of matching one candidate against a route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchDecision {
    /// The candidate is within the buffer and was associated.
    Associated {
        distance_meters: f64,
        write: AssociationWrite,
    },
    /// The candidate passed the bounding-box pre-filter but lies outside
    /// the true buffer.
    OutsideBuffer { distance_meters: f64 },
}

/// Matches a cached property against the route's buffered path.
///
/// The buffer boundary is inclusive: a candidate exactly at the buffer
/// distance is associated. On association the row is upserted: inserted
/// with `now_ms` as its discovery timestamp, or updated in place with only
/// the distance overwritten.
pub async fn match_candidate(
    pool: &SqlitePool,
    geometry: &RouteGeometry,
    route_id: i64,
    property_id: i64,
    lon: f64,
    lat: f64,
    buffer_meters: f64,
    now_ms: i64,
) -> Result<MatchDecision, DatabaseError> {
    let distance_meters = geometry.distance_to(lon, lat);
    if distance_meters > buffer_meters {
        return Ok(MatchDecision::OutsideBuffer { distance_meters });
    }

    let write = upsert_association(pool, route_id, property_id, distance_meters, now_ms).await?;
    Ok(MatchDecision::Associated {
        distance_meters,
        write,
    })
}
