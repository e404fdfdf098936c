//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the
//! application, including timeouts, geometry parameters, and other
//! operational defaults.

/// Default SQLite database path.
pub const DB_PATH: &str = "./route_scout.db";

/// Default search buffer around the route path, in meters.
///
/// A property is associated with a route when its precise distance to the
/// route path is within this buffer. The provider bounding box is expanded
/// by at least the same amount so the box always contains the buffered
/// region.
pub const DEFAULT_BUFFER_METERS: f64 = 100.0;

/// Default property cache TTL in hours.
///
/// A cached property older than this is overwritten on the next upsert;
/// a younger one is left untouched.
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 24;

// Network operation timeouts
/// Per-request timeout for provider queries in seconds.
pub const PROVIDER_TIMEOUT_SECS: u64 = 10;
/// TCP connect timeout for provider queries in seconds.
/// Set separately from the request timeout so unreachable hosts fail fast
/// instead of hanging for the full request timeout.
pub const PROVIDER_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Default base URL for the primary (ATTOM-style) provider.
pub const DEFAULT_ATTOM_ENDPOINT: &str = "https://api.gateway.attomdata.com/propertyapi/v1.0.0";
/// Default base URL for the fallback (Estated-style) provider.
pub const DEFAULT_ESTATED_ENDPOINT: &str = "https://apis.estated.com";

/// Default property-type filter sent to providers.
pub const DEFAULT_PROPERTY_TYPE: &str = "residential";
/// Default listing-status filter sent to providers.
pub const DEFAULT_LISTING_STATUS: &str = "for_sale";

/// Default number of routes enriched concurrently by `enrich_all_routes`.
pub const DEFAULT_ENRICH_CONCURRENCY: usize = 8;

// Geometry
/// Meters per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
/// Mean Earth radius in meters. Matches the haversine radius used by the
/// geo crate so segment math and point math agree.
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;
/// Latitude magnitude beyond which longitude padding is clamped; the
/// cosine term degenerates at the poles.
pub const MAX_BBOX_LATITUDE: f64 = 89.9;

// HTTP status codes (for clarity and consistency)
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
