//! Integration tests for the `/properties` endpoint
//!
//! The router is driven in-process with `oneshot` against a counting
//! in-memory catalog, so the tests can observe exactly how often the
//! upstream is consulted.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use listing_proxy::app::clock::FixedClock;
use listing_proxy::app::{
    BucketCache, CachePopulator, EligibilityRules, ListingService, StaticListingSource,
};
use listing_proxy::errors::UpstreamError;
use listing_proxy::server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const INSIDE: (f64, f64) = (-23.5570, -46.6650);
const OUTSIDE: (f64, f64) = (-23.5020, -46.7165);

fn listing(id: &str, business_type: &str, price: &str, at: (f64, f64)) -> Value {
    json!({
        "id": id,
        "usableAreas": 70,
        "listingType": "USED",
        "createdAt": "2017-04-22T18:39:31.138Z",
        "updatedAt": "2017-04-22T18:39:31.138Z",
        "owner": false,
        "images": [],
        "address": {
            "city": "",
            "neighborhood": "",
            "geoLocation": {
                "precision": "ROOFTOP",
                "location": {"lat": at.0, "lon": at.1}
            }
        },
        "bathrooms": 1,
        "bedrooms": 2,
        "pricingInfos": {
            "price": price,
            "businessType": business_type
        }
    })
}

fn source_from(listings: Vec<Value>) -> Arc<StaticListingSource> {
    Arc::new(StaticListingSource::from_json(&Value::Array(listings).to_string()).unwrap())
}

fn app_with(source: Arc<StaticListingSource>, ttl: Duration) -> Router {
    let cache = Arc::new(BucketCache::new(ttl));
    let clock = Arc::new(FixedClock(
        "2024-05-01T12:00:00Z".parse().unwrap(),
    ));
    let populator = CachePopulator::new(source, cache, EligibilityRules::default(), clock);
    router(AppState::new(Arc::new(ListingService::new(Arc::new(populator)))))
}

fn app(source: Arc<StaticListingSource>) -> Router {
    app_with(source, Duration::from_secs(600))
}

async fn get(app: &Router, source: Option<&str>, query: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(format!("/properties{}", query));
    if let Some(source) = source {
        builder = builder.header("source", source);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_missing_source_is_rejected() {
    let upstream = source_from(vec![]);
    let app = app(Arc::clone(&upstream));

    let (status, body) = get(&app, None, "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Source not accepted."}));

    let (status, body) = get(&app, Some(""), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Source not accepted."}));

    assert_eq!(upstream.fetch_count(), 0);
}

#[tokio::test]
async fn test_unknown_source_is_rejected() {
    let app = app(source_from(vec![]));

    for source in ["xxx", "Zap", "VIVAREAL"] {
        let (status, body) = get(&app, Some(source), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Source not accepted."}));
    }
}

#[tokio::test]
async fn test_zap_sale_inside_fence_is_discounted() {
    let app = app(source_from(vec![listing("a", "SALE", "650000", INSIDE)]));

    let (status, body) = get(&app, Some("zap"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listings"][0]["id"], "a");
    assert_eq!(body["listings"][0]["pricingInfos"]["price"], json!(585000.0));
    assert_eq!(body["listings"][0]["updatedAt"], "2024-05-01T12:00:00Z");
    assert_eq!(body["propertiestotalCount"], 1);
}

#[tokio::test]
async fn test_discount_does_not_leak_into_vivareal() {
    let app = app(source_from(vec![listing("a", "SALE", "800000", INSIDE)]));

    let (_, zap) = get(&app, Some("zap"), "").await;
    let (_, vivareal) = get(&app, Some("vivareal"), "").await;

    assert_eq!(zap["listings"][0]["pricingInfos"]["price"], json!(720000.0));
    assert_eq!(vivareal["listings"][0]["pricingInfos"]["price"], json!(800000.0));
    assert_eq!(
        vivareal["listings"][0]["updatedAt"],
        "2017-04-22T18:39:31.138Z"
    );
}

#[tokio::test]
async fn test_pagination_over_http() {
    let listings = (0..25)
        .map(|i| listing(&format!("l{i}"), "SALE", "750000", OUTSIDE))
        .collect();
    let app = app(source_from(listings));

    let (status, body) = get(&app, Some("zap"), "?offset=0&limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["listings"].as_array().unwrap().len(), 10);
    assert_eq!(body["pageNumber"], 0);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["propertiestotalCount"], 25);

    let (_, body) = get(&app, Some("zap"), "?offset=2&limit=10").await;
    assert_eq!(body["pageSize"], 5);
    assert_eq!(body["listings"][0]["id"], "l20");

    let (_, body) = get(&app, Some("zap"), "?offset=9&limit=10").await;
    assert_eq!(body["listings"], json!([]));
    assert_eq!(body["pageSize"], 0);
    assert_eq!(body["propertiestotalCount"], 25);
}

#[tokio::test]
async fn test_invalid_pagination_uses_defaults() {
    let listings = (0..12)
        .map(|i| listing(&format!("l{i}"), "SALE", "750000", OUTSIDE))
        .collect();
    let app = app(source_from(listings));

    let (status, body) = get(&app, Some("vivareal"), "?offset=abc&limit=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageNumber"], 0);
    assert_eq!(body["pageSize"], 10);
    assert_eq!(body["propertiestotalCount"], 12);
}

#[tokio::test]
async fn test_repeated_requests_are_served_from_cache() {
    let upstream = source_from(vec![
        listing("a", "SALE", "650000", INSIDE),
        listing("b", "SALE", "900000", OUTSIDE),
    ]);
    let app = app(Arc::clone(&upstream));

    let first = get(&app, Some("zap"), "?offset=0&limit=1").await;
    let second = get(&app, Some("zap"), "?offset=0&limit=1").await;
    let sibling = get(&app, Some("vivareal"), "").await;

    assert_eq!(first, second);
    assert_eq!(sibling.0, StatusCode::OK);
    assert_eq!(upstream.fetch_count(), 1);
}

#[tokio::test]
async fn test_concurrent_first_requests_fetch_once() {
    let upstream = Arc::new(
        StaticListingSource::from_json(
            &json!([listing("a", "SALE", "650000", INSIDE)]).to_string(),
        )
        .unwrap()
        .with_delay(Duration::from_millis(50)),
    );
    let app = app(Arc::clone(&upstream));

    let requests = (0..8).map(|i| {
        let app = app.clone();
        let source = if i % 2 == 0 { "zap" } else { "vivareal" };
        async move { get(&app, Some(source), "").await }
    });
    let responses = futures::future::join_all(requests).await;

    assert!(responses.iter().all(|(status, _)| *status == StatusCode::OK));
    assert_eq!(upstream.fetch_count(), 1);
}

#[tokio::test]
async fn test_upstream_failure_is_reported() {
    let upstream = Arc::new(StaticListingSource::failing(UpstreamError::Decode {
        message: "invalid type: map, expected a sequence".to_string(),
    }));
    let app = app(Arc::clone(&upstream));

    let (status, body) = get(&app, Some("zap"), "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({"error": "invalid type: map, expected a sequence"})
    );

    // Failures are not cached
    get(&app, Some("zap"), "").await;
    assert_eq!(upstream.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_buckets_are_repopulated() {
    let upstream = source_from(vec![listing("a", "SALE", "650000", INSIDE)]);
    let app = app_with(Arc::clone(&upstream), Duration::from_secs(600));

    get(&app, Some("zap"), "").await;
    tokio::time::advance(Duration::from_secs(599)).await;
    get(&app, Some("vivareal"), "").await;
    assert_eq!(upstream.fetch_count(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    let (status, _) = get(&app, Some("zap"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(upstream.fetch_count(), 2);
}
