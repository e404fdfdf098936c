//! Row models for the storage layer.
//!
//! Rows are mapped by hand from `sqlx` rows (see the submodules that load
//! them); timestamps are epoch milliseconds, dates ISO-8601 text.

use serde::Serialize;

/// A recorded route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRow {
    pub id: i64,
    /// Opaque owner reference; identity management lives outside this crate.
    pub owner: String,
    /// ISO-8601 date the route was driven.
    pub recorded_date: String,
    /// Epoch milliseconds the route was stored.
    pub uploaded_at: i64,
    /// Geodesic path length; None when the route had no usable geometry.
    pub total_distance_meters: Option<f64>,
    pub point_count: i64,
}

/// A single GPS sample belonging to a route.
#[derive(Debug, Clone)]
pub struct RoutePointRow {
    pub id: i64,
    pub route_id: i64,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy_meters: Option<f64>,
    pub speed_mps: Option<f64>,
}

/// A cached property record sourced from an external provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRow {
    pub id: i64,
    /// Provider-issued identifier, namespaced by provider name.
    pub external_id: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price: Option<f64>,
    pub bedrooms: Option<i64>,
    pub bathrooms: Option<f64>,
    pub sqft: Option<i64>,
    pub lot_sqft: Option<i64>,
    pub year_built: Option<i64>,
    pub property_type: Option<String>,
    /// ISO-8601 listing date as reported by the provider.
    pub listing_date: Option<String>,
    pub photo_url: Option<String>,
    /// Concrete provider name the record was last sourced from.
    pub source: String,
    /// Epoch milliseconds of the last provider refresh.
    pub last_refreshed: i64,
}
