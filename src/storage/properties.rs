//! The property cache.
//!
//! Properties are keyed by their provider-issued external identifier. The
//! upsert is a single atomic conditional write: insert when absent, refresh
//! when stale, leave untouched when fresh. Records are never deleted by the
//! enrichment pipeline.

use log::debug;
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::error_handling::DatabaseError;
use crate::providers::PropertyCandidate;
use crate::rarity::Rarity;
use crate::storage::is_conflict;
use crate::storage::models::PropertyRow;

/// Outcome of a cache upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyUpsert {
    /// A new record was inserted or a stale one refreshed.
    Stored { property_id: i64 },
    /// The existing record was fresh and left untouched.
    Unchanged { property_id: i64 },
}

impl PropertyUpsert {
    pub fn property_id(&self) -> i64 {
        match self {
            PropertyUpsert::Stored { property_id } | PropertyUpsert::Unchanged { property_id } => {
                *property_id
            }
        }
    }
}

/// A cached property joined with its association to one route.
///
/// The rarity label is derived from the cached price at read time; it is
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredProperty {
    #[serde(flatten)]
    pub property: PropertyRow,
    pub distance_meters: f64,
    pub discovered_at: i64,
    pub rarity: Rarity,
}

/// Upserts a normalized candidate into the cache.
///
/// - Absent: inserts a new record stamped `now_ms`.
/// - Present and stale (`now_ms - last_refreshed >= ttl_ms`): overwrites
///   every provider-sourced field and the refresh stamp.
/// - Present and fresh: leaves the row untouched and returns
///   [`PropertyUpsert::Unchanged`].
///
/// The whole decision is one conditional `INSERT .. ON CONFLICT DO UPDATE
/// .. WHERE`, so concurrent upserts of the same external id converge on a
/// single row. A lost unique-key race is retried once.
pub async fn upsert_property(
    pool: &SqlitePool,
    candidate: &PropertyCandidate,
    now_ms: i64,
    ttl_ms: i64,
) -> Result<PropertyUpsert, DatabaseError> {
    match try_upsert(pool, candidate, now_ms, ttl_ms).await {
        Ok(outcome) => Ok(outcome),
        Err(e) if is_conflict(&e) => {
            debug!(
                "property upsert raced for {}, retrying once",
                candidate.external_id
            );
            try_upsert(pool, candidate, now_ms, ttl_ms)
                .await
                .map_err(DatabaseError::SqlError)
        }
        Err(e) => Err(DatabaseError::SqlError(e)),
    }
}

async fn try_upsert(
    pool: &SqlitePool,
    candidate: &PropertyCandidate,
    now_ms: i64,
    ttl_ms: i64,
) -> Result<PropertyUpsert, sqlx::Error> {
    let written: Option<i64> = sqlx::query_scalar(
        "INSERT INTO properties (
             external_id, address, city, state, zip, latitude, longitude,
             price, bedrooms, bathrooms, sqft, lot_sqft, year_built,
             property_type, listing_date, photo_url, source, last_refreshed
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
         ON CONFLICT(external_id) DO UPDATE SET
             address = excluded.address,
             city = excluded.city,
             state = excluded.state,
             zip = excluded.zip,
             latitude = excluded.latitude,
             longitude = excluded.longitude,
             price = excluded.price,
             bedrooms = excluded.bedrooms,
             bathrooms = excluded.bathrooms,
             sqft = excluded.sqft,
             lot_sqft = excluded.lot_sqft,
             year_built = excluded.year_built,
             property_type = excluded.property_type,
             listing_date = excluded.listing_date,
             photo_url = excluded.photo_url,
             source = excluded.source,
             last_refreshed = excluded.last_refreshed
         WHERE excluded.last_refreshed - properties.last_refreshed >= ?19
         RETURNING id",
    )
    .bind(&candidate.external_id)
    .bind(&candidate.address)
    .bind(&candidate.city)
    .bind(&candidate.state)
    .bind(&candidate.zip)
    .bind(candidate.latitude)
    .bind(candidate.longitude)
    .bind(candidate.price)
    .bind(candidate.bedrooms)
    .bind(candidate.bathrooms)
    .bind(candidate.sqft)
    .bind(candidate.lot_sqft)
    .bind(candidate.year_built)
    .bind(&candidate.property_type)
    .bind(candidate.listing_date.map(|d| d.to_string()))
    .bind(&candidate.photo_url)
    .bind(candidate.source)
    .bind(now_ms)
    .bind(ttl_ms)
    .fetch_optional(pool)
    .await?;

    match written {
        Some(property_id) => Ok(PropertyUpsert::Stored { property_id }),
        None => {
            // The conditional update declined: the row exists and is fresh.
            let property_id: i64 =
                sqlx::query_scalar("SELECT id FROM properties WHERE external_id = ?1")
                    .bind(&candidate.external_id)
                    .fetch_one(pool)
                    .await?;
            Ok(PropertyUpsert::Unchanged { property_id })
        }
    }
}

/// Loads a cached property by its external identifier.
pub async fn get_property_by_external_id(
    pool: &SqlitePool,
    external_id: &str,
) -> Result<Option<PropertyRow>, DatabaseError> {
    let row = sqlx::query(
        "SELECT id, external_id, address, city, state, zip, latitude, longitude,
                price, bedrooms, bathrooms, sqft, lot_sqft, year_built,
                property_type, listing_date, photo_url, source, last_refreshed
         FROM properties WHERE external_id = ?1",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| property_from_row(&r)))
}

/// Properties associated with a route, nearest first, with rarity computed
/// on read.
pub async fn list_for_route(
    pool: &SqlitePool,
    route_id: i64,
) -> Result<Vec<DiscoveredProperty>, DatabaseError> {
    let rows = sqlx::query(
        "SELECT p.id, p.external_id, p.address, p.city, p.state, p.zip,
                p.latitude, p.longitude, p.price, p.bedrooms, p.bathrooms,
                p.sqft, p.lot_sqft, p.year_built, p.property_type,
                p.listing_date, p.photo_url, p.source, p.last_refreshed,
                rp.distance_meters, rp.discovered_at
         FROM route_properties rp
         JOIN properties p ON p.id = rp.property_id
         WHERE rp.route_id = ?1
         ORDER BY rp.distance_meters ASC",
    )
    .bind(route_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| {
            let property = property_from_row(r);
            let rarity = Rarity::from_price(property.price);
            DiscoveredProperty {
                distance_meters: r.get("distance_meters"),
                discovered_at: r.get("discovered_at"),
                rarity,
                property,
            }
        })
        .collect())
}

fn property_from_row(r: &sqlx::sqlite::SqliteRow) -> PropertyRow {
    PropertyRow {
        id: r.get("id"),
        external_id: r.get("external_id"),
        address: r.get("address"),
        city: r.get("city"),
        state: r.get("state"),
        zip: r.get("zip"),
        latitude: r.get("latitude"),
        longitude: r.get("longitude"),
        price: r.get("price"),
        bedrooms: r.get("bedrooms"),
        bathrooms: r.get("bathrooms"),
        sqft: r.get("sqft"),
        lot_sqft: r.get("lot_sqft"),
        year_built: r.get("year_built"),
        property_type: r.get("property_type"),
        listing_date: r.get("listing_date"),
        photo_url: r.get("photo_url"),
        source: r.get("source"),
        last_refreshed: r.get("last_refreshed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::run_migrations;

    const TTL_MS: i64 = 24 * 60 * 60 * 1000;

    async fn create_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database pool");
        run_migrations(&pool).await.expect("Failed to run migrations");
        pool
    }

    fn candidate(external_id: &str) -> PropertyCandidate {
        PropertyCandidate {
            external_id: external_id.to_string(),
            address: Some("123 Main St".to_string()),
            city: Some("Boulder".to_string()),
            state: Some("CO".to_string()),
            zip: Some("80301".to_string()),
            latitude: 40.0,
            longitude: -105.0,
            price: Some(650_000.0),
            bedrooms: Some(3),
            bathrooms: Some(2.5),
            sqft: Some(1_850),
            lot_sqft: Some(6_500),
            year_built: Some(1979),
            property_type: Some("sfr".to_string()),
            listing_date: None,
            photo_url: None,
            source: "attom",
        }
    }

    #[tokio::test]
    async fn test_insert_new_property() {
        let pool = create_test_pool().await;
        let outcome = upsert_property(&pool, &candidate("attom:1"), 1_000, TTL_MS)
            .await
            .unwrap();
        assert!(matches!(outcome, PropertyUpsert::Stored { .. }));

        let row = get_property_by_external_id(&pool, "attom:1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.city.as_deref(), Some("Boulder"));
        assert_eq!(row.last_refreshed, 1_000);
    }

    #[tokio::test]
    async fn test_fresh_property_left_untouched() {
        let pool = create_test_pool().await;
        upsert_property(&pool, &candidate("attom:1"), 1_000, TTL_MS)
            .await
            .unwrap();
        let before = get_property_by_external_id(&pool, "attom:1")
            .await
            .unwrap()
            .unwrap();

        // One hour later with different provider data: still fresh.
        let mut changed = candidate("attom:1");
        changed.price = Some(999_999.0);
        changed.city = Some("Denver".to_string());
        let outcome = upsert_property(&pool, &changed, 1_000 + 3_600_000, TTL_MS)
            .await
            .unwrap();
        assert!(matches!(outcome, PropertyUpsert::Unchanged { .. }));

        let after = get_property_by_external_id(&pool, "attom:1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before, after, "fresh record must be byte-for-byte unchanged");
    }

    #[tokio::test]
    async fn test_stale_property_refreshed() {
        let pool = create_test_pool().await;
        upsert_property(&pool, &candidate("attom:1"), 1_000, TTL_MS)
            .await
            .unwrap();

        let mut changed = candidate("attom:1");
        changed.price = Some(2_100_000.0);
        let later = 1_000 + TTL_MS; // exactly TTL old: stale (>=)
        let outcome = upsert_property(&pool, &changed, later, TTL_MS).await.unwrap();
        assert!(matches!(outcome, PropertyUpsert::Stored { .. }));

        let row = get_property_by_external_id(&pool, "attom:1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.price, Some(2_100_000.0));
        assert_eq!(row.last_refreshed, later);
    }

    #[tokio::test]
    async fn test_upsert_never_duplicates_external_id() {
        let pool = create_test_pool().await;
        let first = upsert_property(&pool, &candidate("attom:1"), 1_000, TTL_MS)
            .await
            .unwrap();
        let second = upsert_property(&pool, &candidate("attom:1"), 2_000, TTL_MS)
            .await
            .unwrap();
        assert_eq!(first.property_id(), second.property_id());

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM properties WHERE external_id = 'attom:1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);
    }
}
