// Route lifecycle: ingest, enrich, read views, delete. Deleting a route
// must remove its points and associations but leave cached properties.

mod helpers;

use httptest::Server;

use route_scout::{
    build_providers, delete_route, enrich_route, get_property_by_external_id, get_route,
    ingest_route, list_for_route, list_routes, owner_stats,
};

use helpers::*;

#[tokio::test]
async fn test_full_lifecycle() {
    let pool = create_test_pool().await;
    let date = chrono::NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    let route_id = ingest_route(&pool, "alice", date, &straight_line_samples())
        .await
        .unwrap()
        .route_id;

    let primary = Server::run();
    expect_attom_records(
        &primary,
        vec![
            attom_record(21, 0.002245, 0.000449, 2_200_000.0),
            attom_record(22, 0.002245, -0.000449, 400_000.0),
        ],
    );
    let config = test_config(Some(&primary), None);
    let providers = build_providers(&config).unwrap();

    let report = enrich_route(&pool, &providers, &config, route_id).await.unwrap();
    assert_eq!(report.associated, 2);

    // Read views
    let routes = list_routes(&pool, Some("alice")).await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].property_count, 2);
    let distance = routes[0].route.total_distance_meters.unwrap();
    assert!((distance - 500.0).abs() < 5.0);

    let properties = list_for_route(&pool, route_id).await.unwrap();
    assert_eq!(properties.len(), 2);
    // Nearest first; both are ~50 m away so just confirm ordering holds.
    assert!(properties[0].distance_meters <= properties[1].distance_meters);

    let stats = owner_stats(&pool, Some("alice")).await.unwrap();
    assert_eq!(stats.total_routes, 1);
    assert_eq!(stats.total_properties, 2);
    assert_eq!(stats.rarity_breakdown.legendary, 1);
    assert_eq!(stats.rarity_breakdown.common, 1);

    // Delete the route: points and associations go, the cache stays.
    assert!(delete_route(&pool, route_id).await.unwrap());
    assert!(get_route(&pool, route_id).await.unwrap().is_none());
    assert!(list_for_route(&pool, route_id).await.unwrap().is_empty());
    assert!(get_property_by_external_id(&pool, "attom:21")
        .await
        .unwrap()
        .is_some());

    let stats = owner_stats(&pool, Some("alice")).await.unwrap();
    assert_eq!(stats.total_routes, 0);
    assert_eq!(stats.total_properties, 0);
}
