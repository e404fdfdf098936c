//! route_scout library: route-geometry + proximity enrichment pipeline
//!
//! This library ingests time-ordered GPS samples as routes, derives each
//! route's path geometry, and discovers real-estate property records near
//! that path by querying external property-data providers (primary with
//! fallback), filtering candidates by precise geodesic distance, and
//! caching them in a SQLite database with staleness-based refresh.
//!
//! # Example
//!
//! ```no_run
//! use route_scout::{build_providers, enrich_route, init_db_pool_with_path, run_migrations, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let pool = init_db_pool_with_path(&config.db_path).await?;
//! run_migrations(&pool).await?;
//!
//! let providers = build_providers(&config)?;
//! let report = enrich_route(&pool, &providers, &config, 1).await?;
//! println!("associated {} properties with route 1", report.associated);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or ensure you're calling library functions within an async
//! context.

pub mod config;
mod enrichment;
mod error_handling;
mod geometry;
mod ingest;
mod matcher;
mod providers;
mod rarity;
mod storage;

// Re-export public API
pub use config::{Config, LogLevel};
pub use enrichment::{enrich_all_routes, enrich_route, EnrichmentOutcome, EnrichmentReport};
pub use error_handling::{DatabaseError, GeometryError};
pub use geometry::{BoundingBox, RouteGeometry, SampleCoord};
pub use ingest::{ingest_route, IngestReport, RouteSample};
pub use matcher::{match_candidate, MatchDecision};
pub use providers::{
    build_providers, AttomProvider, BboxQuery, EstatedProvider, NormalizedBatch,
    PropertyCandidate, PropertyProvider, ProviderQuery, ProviderUnavailable, UnavailableReason,
};
pub use rarity::Rarity;
pub use storage::{
    delete_route, get_property_by_external_id, get_route, init_db_pool, init_db_pool_with_path,
    list_for_route, list_routes, owner_stats, run_migrations, upsert_property, AssociationWrite,
    DiscoveredProperty, OwnerStats, PropertyRow, PropertyUpsert, RouteRow, RouteSummary,
};
