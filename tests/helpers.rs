// Shared test helpers for database setup and provider doubles.
//
// This module provides common utilities used across multiple test files to
// reduce duplication.

use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::json;
use sqlx::SqlitePool;

use route_scout::{run_migrations, Config, RouteSample};

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Samples forming a straight ~500 m line north along the prime meridian,
/// recorded over 20 seconds.
#[allow(dead_code)]
pub fn straight_line_samples() -> Vec<RouteSample> {
    let coords = [(0.0, 0.0), (0.002245, 0.0), (0.004491, 0.0)];
    coords
        .iter()
        .enumerate()
        .map(|(i, (lat, lon))| RouteSample {
            timestamp: format!("2026-08-01T08:00:{:02}Z", i * 10),
            lat: Some(*lat),
            lon: Some(*lon),
            accuracy: Some(5.0),
            speed: Some(12.0),
        })
        .collect()
}

/// Config wired to a test server for the primary provider and another for
/// the fallback. Pass `None` to leave a provider unconfigured.
#[allow(dead_code)]
pub fn test_config(primary: Option<&Server>, fallback: Option<&Server>) -> Config {
    let mut config = Config::default();
    if let Some(server) = primary {
        config.primary.endpoint = Some(server.url_str(""));
        config.primary.api_key = Some("test-attom-key".to_string());
    }
    if let Some(server) = fallback {
        config.fallback.endpoint = Some(server.url_str(""));
        config.fallback.api_key = Some("test-estated-key".to_string());
    }
    config
}

/// An ATTOM-style record at the given coordinates.
#[allow(dead_code)]
pub fn attom_record(id: i64, lat: f64, lon: f64, price: f64) -> serde_json::Value {
    json!({
        "identifier": {"attomId": id},
        "address": {
            "line1": format!("{id} Meridian Way"),
            "locality": "Nullsburg",
            "countrySubd": "NA",
            "postal1": "00001"
        },
        "location": {"latitude": lat.to_string(), "longitude": lon.to_string()},
        "sale": {"amount": {"saleAmt": price}, "saleTransDate": "2026-07-15"},
        "building": {
            "rooms": {"beds": 3, "bathsTotal": 2.0},
            "size": {"universalSize": 1600},
            "summary": {"yearBuilt": 1995, "propClass": "sfr"}
        },
        "lot": {"lotSize2": 5000}
    })
}

/// An Estated-style record at the given coordinates.
#[allow(dead_code)]
pub fn estated_record(id: &str, lat: f64, lon: f64, price: f64) -> serde_json::Value {
    json!({
        "id": id,
        "address": {
            "street": format!("{id} Fallback Ave"),
            "city": "Nullsburg",
            "state": "NA",
            "zip_code": "00001"
        },
        "coordinates": {"latitude": lat, "longitude": lon},
        "valuation": {"value": price},
        "structure": {
            "beds_count": 4,
            "baths": 2.5,
            "total_area_sq_ft": 2000,
            "year_built": 2001
        },
        "parcel": {"area_sq_ft": 7000},
        "listing": {"date": "2026-07-01", "type": "single_family"}
    })
}

/// Expects any number of snapshot queries on the primary provider server
/// and answers with the given records.
#[allow(dead_code)]
pub fn expect_attom_records(server: &Server, records: Vec<serde_json::Value>) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/property/snapshot"))
            .times(1..)
            .respond_with(json_encoded(json!({
                "status": {"code": 0},
                "property": records
            }))),
    );
}

/// Expects any number of search queries on the fallback provider server
/// and answers with the given records.
#[allow(dead_code)]
pub fn expect_estated_records(server: &Server, records: Vec<serde_json::Value>) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/v4/properties/search"))
            .times(1..)
            .respond_with(json_encoded(json!({
                "data": records,
                "metadata": {"results": "ok"}
            }))),
    );
}

/// Expects snapshot queries on the primary server and fails them all with
/// the given status code.
#[allow(dead_code)]
pub fn expect_attom_failure(server: &Server, status: u16) {
    server.expect(
        Expectation::matching(request::method_path("GET", "/property/snapshot"))
            .times(1..)
            .respond_with(status_code(status)),
    );
}
