use foster_locations::{
    CachedLocationStore, DirectoryError, LocationPageService, LocationRequest, LocationStore, RestLocationStore,
};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn all_locations() -> serde_json::Value {
    json!([
        {"id": "11111111-1111-4111-8111-111111111111", "name": "England", "slug": "england", "type": "country", "agency_count": 20},
        {"id": "22222222-2222-4222-8222-222222222222", "name": "South East", "slug": "south-east", "type": "region",
         "parent_id": "11111111-1111-4111-8111-111111111111", "agency_count": 12},
        {"id": "33333333-3333-4333-8333-333333333333", "name": "Surrey", "slug": "surrey", "type": "county",
         "parent_id": "22222222-2222-4222-8222-222222222222", "agency_count": 7},
        {"id": "44444444-4444-4444-8444-444444444444", "name": "Guildford", "slug": "guildford", "type": "city",
         "parent_id": "33333333-3333-4333-8333-333333333333", "agency_count": 5},
        {"id": "55555555-5555-4555-8555-555555555555", "name": "Woking", "slug": "woking", "type": "city",
         "parent_id": "33333333-3333-4333-8333-333333333333", "agency_count": 2}
    ])
}

#[tokio::test]
async fn test_cached_page_only_fetches_table_once() {
    let server = MockServer::start();
    let list_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/locations")
            .query_param("order", "name.asc");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(all_locations());
    });
    let agencies_mock = server.mock(|when, then| {
        when.method(GET).path("/rest/v1/agencies");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([]));
    });

    let backend = RestLocationStore::new(&server.base_url(), None, Duration::from_secs(5)).unwrap();
    let cached = CachedLocationStore::new(backend);
    assert_eq!(cached.refresh().await.unwrap(), 5);

    let service = LocationPageService::new(cached);
    let surrey = service.load(&LocationRequest::parse("england/south-east/surrey")).await;
    let woking = service.load(&LocationRequest::parse("woking")).await;

    list_mock.assert_hits(1);
    agencies_mock.assert_hits(2);
    assert_eq!(surrey.aggregate_count, 7);
    assert_eq!(surrey.children.len(), 2);
    assert_eq!(woking.url, "/locations/england/south-east/surrey/woking");
}

#[tokio::test]
async fn test_unloaded_cache_falls_back_to_backend() {
    let server = MockServer::start();
    let lookup_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/rest/v1/locations")
            .query_param("slug", "eq.england");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!([all_locations()[0]]));
    });

    let backend = RestLocationStore::new(&server.base_url(), None, Duration::from_secs(5)).unwrap();
    let cached = CachedLocationStore::new(backend);

    let england = cached.get_location_by_slug_or_id("england").await.unwrap();

    lookup_mock.assert();
    assert!(!cached.is_loaded().await);
    assert_eq!(england.unwrap().name, "England");
}

#[tokio::test]
async fn test_failed_refresh_leaves_cache_unloaded() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/locations");
        then.status(503).body("upstream unavailable");
    });

    let backend = RestLocationStore::new(&server.base_url(), None, Duration::from_secs(5)).unwrap();
    let cached = CachedLocationStore::new(backend);

    let err = cached.refresh().await.unwrap_err();

    assert!(err.is_transient());
    assert!(!cached.is_loaded().await);
}

#[tokio::test]
async fn test_warm_tolerates_transient_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/locations");
        then.status(503).body("upstream unavailable");
    });

    let backend = RestLocationStore::new(&server.base_url(), None, Duration::from_secs(5)).unwrap();
    let cached = CachedLocationStore::new(backend);

    assert!(!cached.warm().await.unwrap());
    assert!(!cached.is_loaded().await);
}

#[tokio::test]
async fn test_warm_reports_rejected_key() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/locations");
        then.status(401).body("{\"message\":\"Invalid API key\"}");
    });

    let backend = RestLocationStore::new(&server.base_url(), None, Duration::from_secs(5)).unwrap();
    let cached = CachedLocationStore::new(backend);

    let err = cached.warm().await.unwrap_err();

    assert!(matches!(err, DirectoryError::BackendError { status: 401, .. }));
}
