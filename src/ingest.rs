//! Route ingestion.
//!
//! Turns a batch of recorded GPS samples into a stored route with its
//! points, computing the path length up front. Samples missing coordinates
//! are stored as-is; geometry construction skips them later. A route is
//! immutable once ingested; a corrected sample set becomes a new route.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error_handling::GeometryError;
use crate::geometry::{RouteGeometry, SampleCoord};
use crate::storage::{insert_route_with_points, NewRoutePoint};

/// One recorded GPS sample as uploaded by a tracking client.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSample {
    /// RFC 3339 timestamp of the fix.
    pub timestamp: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Reported horizontal accuracy in meters.
    #[serde(default)]
    pub accuracy: Option<f64>,
    /// Reported speed in meters per second.
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Summary of a stored route.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub route_id: i64,
    pub point_count: usize,
    /// None when no sample carried usable coordinates.
    pub total_distance_meters: Option<f64>,
}

/// Stores a route and its samples in one transaction.
///
/// # Errors
///
/// Fails on an empty sample set, an unparseable timestamp, or a database
/// failure. Samples without coordinates are accepted and stored; they are
/// invisible to geometry.
pub async fn ingest_route(
    pool: &SqlitePool,
    owner: &str,
    recorded_date: NaiveDate,
    samples: &[RouteSample],
) -> Result<IngestReport> {
    if samples.is_empty() {
        bail!("route must contain at least one sample");
    }

    let mut points = Vec::with_capacity(samples.len());
    for (index, sample) in samples.iter().enumerate() {
        let timestamp = DateTime::parse_from_rfc3339(&sample.timestamp)
            .with_context(|| format!("Invalid timestamp in sample {index}: {:?}", sample.timestamp))?
            .timestamp_millis();
        points.push(NewRoutePoint {
            timestamp,
            latitude: sample.lat,
            longitude: sample.lon,
            accuracy_meters: sample.accuracy,
            speed_mps: sample.speed,
        });
    }
    // Storage orders by (timestamp, id); insert in timestamp order so the
    // id tiebreak reflects upload order.
    points.sort_by_key(|p| p.timestamp);

    let coords: Vec<SampleCoord> = points
        .iter()
        .map(|p| SampleCoord {
            latitude: p.latitude,
            longitude: p.longitude,
        })
        .collect();
    let total_distance_meters = match RouteGeometry::from_samples(&coords) {
        Ok(geometry) => Some(geometry.total_length_meters()),
        Err(GeometryError::InvalidGeometry) => {
            warn!("route for {owner} on {recorded_date} has no usable coordinates");
            None
        }
    };

    let route_id = insert_route_with_points(
        pool,
        owner,
        &recorded_date.to_string(),
        Utc::now().timestamp_millis(),
        total_distance_meters,
        &points,
    )
    .await
    .context("Failed to store route")?;

    info!(
        "ingested route {route_id} for {owner}: {} points, {}",
        points.len(),
        match total_distance_meters {
            Some(m) => format!("{m:.0} m"),
            None => "no usable geometry".to_string(),
        }
    );

    Ok(IngestReport {
        route_id,
        point_count: points.len(),
        total_distance_meters,
    })
}
