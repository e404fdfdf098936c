//! Aggregate statistics over routes and discovered properties.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;
use crate::rarity::Rarity;

/// Count of discovered properties per rarity tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RarityBreakdown {
    pub legendary: i64,
    pub epic: i64,
    pub rare: i64,
    pub common: i64,
}

/// Owner-level dashboard numbers.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerStats {
    pub total_routes: i64,
    pub total_distance_meters: f64,
    pub total_properties: i64,
    pub rarity_breakdown: RarityBreakdown,
}

/// Computes totals and the rarity breakdown, optionally scoped to one
/// owner.
///
/// Rarity is derived from cached prices at read time; tiers are never
/// stored.
pub async fn owner_stats(
    pool: &SqlitePool,
    owner: Option<&str>,
) -> Result<OwnerStats, DatabaseError> {
    let (total_routes, total_distance_meters): (i64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_distance_meters), 0.0)
         FROM routes WHERE (?1 IS NULL OR owner = ?1)",
    )
    .bind(owner)
    .fetch_one(pool)
    .await?;

    let prices: Vec<(Option<f64>,)> = sqlx::query_as(
        "SELECT p.price
         FROM route_properties rp
         JOIN properties p ON p.id = rp.property_id
         JOIN routes r ON r.id = rp.route_id
         WHERE (?1 IS NULL OR r.owner = ?1)",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    let mut breakdown = RarityBreakdown::default();
    for (price,) in &prices {
        match Rarity::from_price(*price) {
            Rarity::Legendary => breakdown.legendary += 1,
            Rarity::Epic => breakdown.epic += 1,
            Rarity::Rare => breakdown.rare += 1,
            Rarity::Common => breakdown.common += 1,
        }
    }

    Ok(OwnerStats {
        total_routes,
        total_distance_meters,
        total_properties: prices.len() as i64,
        rarity_breakdown: breakdown,
    })
}
