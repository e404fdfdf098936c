//! Route-property associations.
//!
//! One row per `(route, property)` pair. `distance_meters` always holds the
//! most recently computed precise value; `discovered_at` is the
//! first-discovery timestamp and is never touched on update.

use log::debug;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::storage::is_conflict;

/// Whether an association upsert created a new row or refreshed an
/// existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationWrite {
    Created,
    Updated,
}

/// Inserts or refreshes the association between a route and a property.
///
/// Tries an in-place distance update first; when the row is absent, inserts
/// it with `now_ms` as the discovery timestamp. The insert still carries an
/// `ON CONFLICT` arm that only touches the distance, so losing an insert
/// race to a concurrent run converges on one row with its original
/// `discovered_at` intact.
pub async fn upsert_association(
    pool: &SqlitePool,
    route_id: i64,
    property_id: i64,
    distance_meters: f64,
    now_ms: i64,
) -> Result<AssociationWrite, DatabaseError> {
    match try_upsert(pool, route_id, property_id, distance_meters, now_ms).await {
        Ok(write) => Ok(write),
        Err(e) if is_conflict(&e) => {
            debug!("association upsert raced for route {route_id} property {property_id}, retrying once");
            try_upsert(pool, route_id, property_id, distance_meters, now_ms)
                .await
                .map_err(DatabaseError::SqlError)
        }
        Err(e) => Err(DatabaseError::SqlError(e)),
    }
}

async fn try_upsert(
    pool: &SqlitePool,
    route_id: i64,
    property_id: i64,
    distance_meters: f64,
    now_ms: i64,
) -> Result<AssociationWrite, sqlx::Error> {
    let updated = sqlx::query(
        "UPDATE route_properties SET distance_meters = ?3
         WHERE route_id = ?1 AND property_id = ?2",
    )
    .bind(route_id)
    .bind(property_id)
    .bind(distance_meters)
    .execute(pool)
    .await?
    .rows_affected();
    if updated > 0 {
        return Ok(AssociationWrite::Updated);
    }

    sqlx::query(
        "INSERT INTO route_properties (route_id, property_id, distance_meters, discovered_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(route_id, property_id) DO UPDATE SET
             distance_meters = excluded.distance_meters",
    )
    .bind(route_id)
    .bind(property_id)
    .bind(distance_meters)
    .bind(now_ms)
    .execute(pool)
    .await?;
    Ok(AssociationWrite::Created)
}
