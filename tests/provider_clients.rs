// Provider client behavior at the HTTP boundary: every transient failure
// class must map to an unavailability value, never an error or a panic.

mod helpers;

use std::time::Duration;

use httptest::{all_of, matchers::*, responders::*, Expectation, Server};

use route_scout::config::ProviderSettings;
use route_scout::{
    AttomProvider, BboxQuery, BoundingBox, EstatedProvider, PropertyProvider, ProviderQuery,
    UnavailableReason,
};

fn bbox_query() -> BboxQuery {
    BboxQuery {
        bbox: BoundingBox {
            min_lon: -0.01,
            min_lat: -0.01,
            max_lon: 0.01,
            max_lat: 0.01,
        },
        property_type: "residential".to_string(),
        listing_status: "for_sale".to_string(),
    }
}

fn attom_for(server: &Server) -> AttomProvider {
    AttomProvider::new(
        &ProviderSettings {
            endpoint: Some(server.url_str("")),
            api_key: Some("key".to_string()),
        },
        Duration::from_secs(2),
    )
    .unwrap()
}

#[tokio::test]
async fn test_attom_parses_candidates() {
    let server = Server::run();
    helpers::expect_attom_records(
        &server,
        vec![helpers::attom_record(11, 0.001, 0.001, 750_000.0)],
    );

    let provider = attom_for(&server);
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Candidates(batch) => {
            assert_eq!(batch.candidates.len(), 1);
            assert_eq!(batch.skipped, 0);
            assert_eq!(batch.candidates[0].external_id, "attom:11");
        }
        other => panic!("expected candidates, got {other:?}"),
    }
}

#[tokio::test]
async fn test_attom_sends_bbox_and_filters() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/property/snapshot"),
            request::query(url_decoded(contains(("propertyType", "residential")))),
            request::query(url_decoded(contains(("status", "for_sale")))),
            request::query(url_decoded(contains(key("minLongitude")))),
            request::query(url_decoded(contains(key("maxLatitude")))),
            request::headers(contains(("apikey", "key"))),
        ])
        .respond_with(json_encoded(serde_json::json!({"property": []}))),
    );

    let provider = attom_for(&server);
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Candidates(batch) => assert!(batch.candidates.is_empty()),
        other => panic!("expected empty candidates, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error_maps_to_unavailable() {
    let server = Server::run();
    helpers::expect_attom_failure(&server, 502);

    let provider = attom_for(&server);
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Unavailable(u) => {
            assert_eq!(u.provider, "attom");
            assert_eq!(u.reason, UnavailableReason::ServerError(502));
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_maps_to_unavailable() {
    let server = Server::run();
    helpers::expect_attom_failure(&server, 429);

    let provider = attom_for(&server);
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Unavailable(u) => assert_eq!(u.reason, UnavailableReason::RateLimited),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_auth_rejection_maps_to_unavailable() {
    let server = Server::run();
    helpers::expect_attom_failure(&server, 401);

    let provider = attom_for(&server);
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Unavailable(u) => assert_eq!(u.reason, UnavailableReason::Rejected(401)),
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_body_maps_to_unavailable() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/property/snapshot"))
            .respond_with(status_code(200).body("this is not json")),
    );

    let provider = attom_for(&server);
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Unavailable(u) => {
            assert_eq!(u.reason, UnavailableReason::MalformedResponse)
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_maps_to_unavailable() {
    // Nothing listens on port 1.
    let provider = AttomProvider::new(
        &ProviderSettings {
            endpoint: Some("http://127.0.0.1:1".to_string()),
            api_key: Some("key".to_string()),
        },
        Duration::from_millis(500),
    )
    .unwrap();

    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Unavailable(u) => match u.reason {
            UnavailableReason::Transport(_) | UnavailableReason::Timeout => {}
            other => panic!("expected transport failure, got {other:?}"),
        },
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unconfigured_provider_reports_not_configured() {
    let provider = AttomProvider::new(&ProviderSettings::default(), Duration::from_secs(1)).unwrap();
    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Unavailable(u) => {
            assert_eq!(u.reason, UnavailableReason::NotConfigured)
        }
        other => panic!("expected unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_estated_parses_candidates_with_photo() {
    let server = Server::run();
    let mut record = helpers::estated_record("e-55", 0.002, 0.002, 450_000.0);
    record["listing"]["photo_url"] = serde_json::json!("https://img.example/e-55.jpg");
    helpers::expect_estated_records(&server, vec![record]);

    let provider = EstatedProvider::new(
        &ProviderSettings {
            endpoint: Some(server.url_str("")),
            api_key: Some("key".to_string()),
        },
        Duration::from_secs(2),
    )
    .unwrap();

    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Candidates(batch) => {
            assert_eq!(batch.candidates.len(), 1);
            let c = &batch.candidates[0];
            assert_eq!(c.external_id, "estated:e-55");
            assert_eq!(c.photo_url.as_deref(), Some("https://img.example/e-55.jpg"));
            assert_eq!(c.source, "estated");
        }
        other => panic!("expected candidates, got {other:?}"),
    }
}

#[tokio::test]
async fn test_estated_skips_malformed_records() {
    let server = Server::run();
    helpers::expect_estated_records(
        &server,
        vec![
            helpers::estated_record("e-1", 0.0, 0.0, 100.0),
            serde_json::json!({"coordinates": "nowhere"}),
            serde_json::json!(17),
        ],
    );

    let provider = EstatedProvider::new(
        &ProviderSettings {
            endpoint: Some(server.url_str("")),
            api_key: Some("key".to_string()),
        },
        Duration::from_secs(2),
    )
    .unwrap();

    match provider.query_bbox(&bbox_query()).await {
        ProviderQuery::Candidates(batch) => {
            assert_eq!(batch.candidates.len(), 1);
            assert_eq!(batch.skipped, 2);
        }
        other => panic!("expected candidates, got {other:?}"),
    }
}
