// storage/migrations.rs
// Database schema management

use sqlx::{Pool, Sqlite};

/// Schema statements, applied in order. Each statement is idempotent so the
/// function can run on every startup.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS routes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        owner TEXT NOT NULL,
        recorded_date TEXT NOT NULL,
        uploaded_at INTEGER NOT NULL,
        total_distance_meters REAL,
        point_count INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_routes_owner_date ON routes(owner, recorded_date)",
    "CREATE TABLE IF NOT EXISTS route_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        route_id INTEGER NOT NULL REFERENCES routes(id),
        timestamp INTEGER NOT NULL,
        latitude REAL,
        longitude REAL,
        accuracy_meters REAL,
        speed_mps REAL
    )",
    "CREATE INDEX IF NOT EXISTS idx_route_points_route_time
        ON route_points(route_id, timestamp)",
    "CREATE TABLE IF NOT EXISTS properties (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        external_id TEXT NOT NULL UNIQUE,
        address TEXT,
        city TEXT,
        state TEXT,
        zip TEXT,
        latitude REAL,
        longitude REAL,
        price REAL,
        bedrooms INTEGER,
        bathrooms REAL,
        sqft INTEGER,
        lot_sqft INTEGER,
        year_built INTEGER,
        property_type TEXT,
        listing_date TEXT,
        photo_url TEXT,
        source TEXT NOT NULL,
        last_refreshed INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_properties_city_price ON properties(city, price)",
    "CREATE TABLE IF NOT EXISTS route_properties (
        route_id INTEGER NOT NULL REFERENCES routes(id),
        property_id INTEGER NOT NULL REFERENCES properties(id),
        distance_meters REAL NOT NULL,
        discovered_at INTEGER NOT NULL,
        PRIMARY KEY (route_id, property_id)
    )",
    "CREATE INDEX IF NOT EXISTS idx_route_properties_distance
        ON route_properties(route_id, distance_meters)",
];

/// Creates the database schema.
///
/// Route deletion is explicit (one transaction removing associations,
/// points, then the route) rather than relying on cascading foreign keys,
/// so the schema declares references without ON DELETE actions.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), anyhow::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
