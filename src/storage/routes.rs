//! Route and route-point persistence.
//!
//! Routes and their points are written once at ingestion and never mutated;
//! deletion removes the route, its points, and its associations in a single
//! explicit transaction.

use log::info;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::storage::models::{RoutePointRow, RouteRow};

/// A GPS sample to be stored at ingestion time.
#[derive(Debug, Clone)]
pub struct NewRoutePoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy_meters: Option<f64>,
    pub speed_mps: Option<f64>,
}

/// A route together with its associated-property count, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSummary {
    #[serde(flatten)]
    pub route: RouteRow,
    pub property_count: i64,
}

/// Inserts a route and all of its points in one transaction.
///
/// Returns the new route id. The points are stored verbatim, including
/// samples missing coordinates; geometry construction skips those later.
pub async fn insert_route_with_points(
    pool: &SqlitePool,
    owner: &str,
    recorded_date: &str,
    uploaded_at: i64,
    total_distance_meters: Option<f64>,
    points: &[NewRoutePoint],
) -> Result<i64, DatabaseError> {
    let mut tx = pool.begin().await?;

    let route_id: i64 = sqlx::query_scalar(
        "INSERT INTO routes (owner, recorded_date, uploaded_at, total_distance_meters, point_count)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING id",
    )
    .bind(owner)
    .bind(recorded_date)
    .bind(uploaded_at)
    .bind(total_distance_meters)
    .bind(points.len() as i64)
    .fetch_one(&mut *tx)
    .await?;

    for p in points {
        sqlx::query(
            "INSERT INTO route_points
                 (route_id, timestamp, latitude, longitude, accuracy_meters, speed_mps)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(route_id)
        .bind(p.timestamp)
        .bind(p.latitude)
        .bind(p.longitude)
        .bind(p.accuracy_meters)
        .bind(p.speed_mps)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(route_id)
}

/// Loads a route by id.
pub async fn get_route(pool: &SqlitePool, route_id: i64) -> Result<Option<RouteRow>, DatabaseError> {
    let row = sqlx::query(
        "SELECT id, owner, recorded_date, uploaded_at, total_distance_meters, point_count
         FROM routes WHERE id = ?1",
    )
    .bind(route_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| route_from_row(&r)))
}

/// Loads a route's points ordered by `(timestamp, id)`.
///
/// The id tiebreak makes ordering stable for duplicate timestamps.
pub async fn load_route_points(
    pool: &SqlitePool,
    route_id: i64,
) -> Result<Vec<RoutePointRow>, DatabaseError> {
    let rows = sqlx::query(
        "SELECT id, route_id, timestamp, latitude, longitude, accuracy_meters, speed_mps
         FROM route_points WHERE route_id = ?1
         ORDER BY timestamp, id",
    )
    .bind(route_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| RoutePointRow {
            id: r.get("id"),
            route_id: r.get("route_id"),
            timestamp: r.get("timestamp"),
            latitude: r.get("latitude"),
            longitude: r.get("longitude"),
            accuracy_meters: r.get("accuracy_meters"),
            speed_mps: r.get("speed_mps"),
        })
        .collect())
}

/// All route ids, oldest first. Used by the all-routes enrichment sweep.
pub async fn list_route_ids(pool: &SqlitePool) -> Result<Vec<i64>, DatabaseError> {
    let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM routes ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().map(|(id,)| id).collect())
}

/// Routes with their associated-property counts, newest first, optionally
/// filtered by owner.
pub async fn list_routes(
    pool: &SqlitePool,
    owner: Option<&str>,
) -> Result<Vec<RouteSummary>, DatabaseError> {
    let sql = "SELECT r.id, r.owner, r.recorded_date, r.uploaded_at,
                      r.total_distance_meters, r.point_count,
                      (SELECT COUNT(*) FROM route_properties rp WHERE rp.route_id = r.id)
                          AS property_count
               FROM routes r
               WHERE (?1 IS NULL OR r.owner = ?1)
               ORDER BY r.recorded_date DESC, r.id DESC";
    let rows = sqlx::query(sql).bind(owner).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|r| RouteSummary {
            route: route_from_row(r),
            property_count: r.get("property_count"),
        })
        .collect())
}

/// Deletes a route, its points, and its associations in one transaction.
///
/// Cached properties are left in place; they belong to the cache, not the
/// route. Returns whether the route existed.
pub async fn delete_route(pool: &SqlitePool, route_id: i64) -> Result<bool, DatabaseError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM route_properties WHERE route_id = ?1")
        .bind(route_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM route_points WHERE route_id = ?1")
        .bind(route_id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM routes WHERE id = ?1")
        .bind(route_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    if deleted > 0 {
        info!("Deleted route {route_id} with its points and associations");
    }
    Ok(deleted > 0)
}

fn route_from_row(r: &sqlx::sqlite::SqliteRow) -> RouteRow {
    RouteRow {
        id: r.get("id"),
        owner: r.get("owner"),
        recorded_date: r.get("recorded_date"),
        uploaded_at: r.get("uploaded_at"),
        total_distance_meters: r.get("total_distance_meters"),
        point_count: r.get("point_count"),
    }
}
