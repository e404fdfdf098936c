//! Durable storage: pool management, schema, and persistence operations.
//!
//! All mutating operations are expressed as atomic conditional writes
//! scoped to their unique keys, so concurrent enrichment runs converge
//! instead of conflicting. No transaction is held across a network call.

mod associations;
mod migrations;
mod models;
mod pool;
mod properties;
mod routes;
mod stats;

pub use associations::{upsert_association, AssociationWrite};
pub use migrations::run_migrations;
pub use models::{PropertyRow, RoutePointRow, RouteRow};
pub use pool::{init_db_pool, init_db_pool_with_path};
pub use properties::{
    get_property_by_external_id, list_for_route, upsert_property, DiscoveredProperty,
    PropertyUpsert,
};
pub use routes::{
    delete_route, get_route, insert_route_with_points, list_route_ids, list_routes,
    load_route_points, NewRoutePoint, RouteSummary,
};
pub use stats::{owner_stats, OwnerStats, RarityBreakdown};

/// Whether an error is a transient unique-key race or lock contention.
///
/// `ON CONFLICT` upserts make true conflicts rare; the residual window is a
/// concurrent writer inserting the same key between statement compilation
/// and execution, or brief `SQLITE_BUSY` lock contention. Callers retry the
/// conditional write once on these and surface everything else.
pub(crate) fn is_conflict(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            let msg = db.message().to_lowercase();
            msg.contains("unique constraint") || msg.contains("database is locked")
        }
        _ => false,
    }
}
