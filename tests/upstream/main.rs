//! Integration tests for the HTTP listing source
//!
//! A throwaway axum server on an ephemeral port stands in for the upstream
//! catalog.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use listing_proxy::app::{
    BucketCache, CachePopulator, ClientConfig, EligibilityRules, HttpListingSource,
    ListingService, ListingSource, PageRequest, SystemClock,
};
use listing_proxy::errors::{ServiceError, UpstreamError};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use url::Url;

const CATALOG: &str = r#"[
    {
        "id": "a",
        "usableAreas": 70,
        "address": {"geoLocation": {"location": {"lat": -23.5020, "lon": -46.7165}}},
        "pricingInfos": {"price": "750000", "businessType": "SALE"}
    },
    {
        "id": "b",
        "usableAreas": 0,
        "address": {"geoLocation": {"location": {"lat": 0, "lon": 0}}},
        "pricingInfos": {"price": "750000", "businessType": "SALE"}
    }
]"#;

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/source.json", get(|| async { CATALOG }))
        .route("/broken.json", get(|| async { "{\"not\": \"a list\"}" }))
        .route(
            "/missing.json",
            get(|| async { (StatusCode::NOT_FOUND, "no such catalog") }),
        )
        .route("/numbers.json", get(|| async {
            axum::Json(json!([{
                "id": "n",
                "address": {"geoLocation": {"location": {"lat": -23.5020, "lon": -46.7165}}},
                "pricingInfos": {"price": 5000, "businessType": "RENTAL", "monthlyCondoFee": 100}
            }]))
        }))
        .route("/nulls.json", get(|| async {
            axum::Json(json!([{
                "id": "z",
                "usableAreas": null,
                "images": null,
                "updatedAt": null,
                "address": {"city": null, "geoLocation": {"location": {"lat": -23.5020, "lon": -46.7165}}},
                "pricingInfos": {"price": "750000", "businessType": "SALE", "monthlyCondoFee": null}
            }]))
        }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    address
}

fn source_for(address: SocketAddr, path: &str) -> HttpListingSource {
    let url = Url::parse(&format!("http://{}{}", address, path)).unwrap();
    HttpListingSource::new(url, &ClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetches_catalog() {
    let address = spawn_upstream().await;
    let source = source_for(address, "/source.json");

    let listings = assert_ok!(source.fetch_listings().await);
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].id, "a");
    assert_eq!(listings[1].usable_areas, 0);
}

#[tokio::test]
async fn test_numeric_prices_are_accepted() {
    let address = spawn_upstream().await;
    let source = source_for(address, "/numbers.json");

    let listings = assert_ok!(source.fetch_listings().await);
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].id, "n");
}

#[tokio::test]
async fn test_null_fields_do_not_reject_catalog() {
    let address = spawn_upstream().await;
    let source = source_for(address, "/nulls.json");

    let listings = assert_ok!(source.fetch_listings().await);
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].usable_areas, 0);
    assert!(listings[0].images.is_empty());
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let address = spawn_upstream().await;
    let source = source_for(address, "/broken.json");

    let error = assert_err!(source.fetch_listings().await);
    assert!(matches!(error, UpstreamError::Decode { .. }), "{error:?}");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let address = spawn_upstream().await;
    let source = source_for(address, "/missing.json");

    match source.fetch_listings().await {
        Err(UpstreamError::Status { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing.json"));
        }
        other => panic!("Expected UpstreamError::Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_service_over_http_upstream() {
    let address = spawn_upstream().await;
    let cache = Arc::new(BucketCache::new(std::time::Duration::from_secs(600)));
    let populator = CachePopulator::new(
        Arc::new(source_for(address, "/source.json")),
        cache,
        EligibilityRules::default(),
        Arc::new(SystemClock),
    );
    let service = ListingService::new(Arc::new(populator));

    // (0,0) listing is dropped from both channels
    let zap = assert_ok!(service.get_page(Some("zap"), PageRequest::default()).await);
    assert_eq!(zap.total_count, 1);
    let vivareal = assert_ok!(service.get_page(Some("vivareal"), PageRequest::default()).await);
    assert_eq!(vivareal.total_count, 1);
}

#[tokio::test]
async fn test_service_reports_upstream_failure() {
    let address = spawn_upstream().await;
    let cache = Arc::new(BucketCache::new(std::time::Duration::from_secs(600)));
    let populator = CachePopulator::new(
        Arc::new(source_for(address, "/missing.json")),
        Arc::clone(&cache),
        EligibilityRules::default(),
        Arc::new(SystemClock),
    );
    let service = ListingService::new(Arc::new(populator));

    let error = assert_err!(service.get_page(Some("zap"), PageRequest::default()).await);
    assert!(matches!(error, ServiceError::Upstream(UpstreamError::Status { status: 404, .. })));
    assert!(error.to_string().contains("HTTP 404"));
    assert!(cache.is_empty());
}
