//! End-to-end tests of the HTTP surface with in-process providers

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use product_lens::{
    api::{build_router, AppState},
    pipeline::{ImageStore, Orchestrator, RawProductEntry, SearchLocale, SearchQuery, StoredImage},
    providers::{DescriptionGenerator, ProductSearcher, SearchError, UpstreamError},
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

struct StubDescriber {
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
    result: Result<String, UpstreamError>,
}

#[async_trait]
impl DescriptionGenerator for StubDescriber {
    async fn describe(&self, image: &StoredImage) -> Result<String, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(image.data.clone());
        self.result.clone()
    }
}

struct StubSearcher {
    calls: AtomicUsize,
    result: Result<Vec<RawProductEntry>, SearchError>,
}

#[async_trait]
impl ProductSearcher for StubSearcher {
    async fn search(&self, _query: &SearchQuery) -> Result<Vec<RawProductEntry>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct Harness {
    router: Router,
    describer: Arc<StubDescriber>,
    searcher: Arc<StubSearcher>,
}

fn harness_with(
    max_data_uri_bytes: usize,
    description: Result<String, UpstreamError>,
    listings: Result<Vec<RawProductEntry>, SearchError>,
) -> Harness {
    harness_with_body_limit(
        max_data_uri_bytes,
        max_data_uri_bytes * 2 + 1024,
        description,
        listings,
    )
}

fn harness_with_body_limit(
    max_data_uri_bytes: usize,
    max_body_bytes: usize,
    description: Result<String, UpstreamError>,
    listings: Result<Vec<RawProductEntry>, SearchError>,
) -> Harness {
    let describer = Arc::new(StubDescriber {
        calls: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
        result: description,
    });
    let searcher = Arc::new(StubSearcher {
        calls: AtomicUsize::new(0),
        result: listings,
    });
    let orchestrator = Orchestrator::new(
        ImageStore::new(max_data_uri_bytes),
        describer.clone(),
        searcher.clone(),
        SearchLocale::default(),
    );
    let router = build_router(AppState::new(orchestrator), max_body_bytes);

    Harness {
        router,
        describer,
        searcher,
    }
}

fn mug_listing() -> Vec<RawProductEntry> {
    vec![RawProductEntry::from_json(json!({
        "source": "Acme",
        "title": "Mug",
        "thumbnail": "u",
        "extracted_price": 9.99,
        "rating": 4.5,
        "location": "NY"
    }))]
}

fn harness() -> Harness {
    harness_with(
        8 * 1024 * 1024,
        Ok("White ceramic coffee mug".to_string()),
        Ok(mug_listing()),
    )
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn post(router: &Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/search/")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(router, request).await
}

async fn get(router: &Router) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri("/search/")
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

#[tokio::test]
async fn test_ingest_returns_stored_length() {
    let h = harness();
    let uri = "data:image/png;base64,AAAA";

    let (status, body) = post(&h.router, json!({ "data_uri": uri }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok", "stored_length": uri.len() }));
}

#[tokio::test]
async fn test_ingest_without_data_uri() {
    let h = harness();

    for payload in ["{}", "", "not json", r#"{"image":"data:x"}"#] {
        let (status, body) = post(&h.router, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload:?}");
        assert_eq!(
            body,
            json!({ "error": "No data_uri provided", "status": "failed" })
        );
    }
}

#[tokio::test]
async fn test_ingest_wrong_type_or_empty() {
    let h = harness();

    for payload in [r#"{"data_uri":""}"#, r#"{"data_uri":7}"#, r#"{"data_uri":null}"#] {
        let (status, body) = post(&h.router, payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
        assert_eq!(body, json!({ "error": "data_uri must be a non-empty string" }));
    }
}

#[tokio::test]
async fn test_ingest_too_large_leaves_store_unchanged() {
    let h = harness_with(32, Ok("mug".to_string()), Ok(mug_listing()));

    let (status, _) = post(&h.router, json!({ "data_uri": "data:small" }).to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let oversized = format!("data:{}", "A".repeat(40));
    let (status, body) = post(&h.router, json!({ "data_uri": oversized }).to_string()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "data_uri too large" }));

    let (status, _) = get(&h.router).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(*h.describer.seen.lock().unwrap(), vec!["data:small".to_string()]);
}

#[tokio::test]
async fn test_body_over_limit_gets_json_413() {
    let h = harness_with_body_limit(1024, 64, Ok("mug".to_string()), Ok(mug_listing()));
    let payload = json!({ "data_uri": format!("data:{}", "A".repeat(200)) }).to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/search/")
        .header("content-type", "application/json")
        .header("content-length", payload.len())
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "data_uri too large" }));

    // Streamed body, no Content-Length
    let chunks: Vec<Result<String, std::io::Error>> = vec![Ok(payload)];
    let (status, body) = post(&h.router, Body::from_stream(futures::stream::iter(chunks))).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({ "error": "data_uri too large" }));

    let (status, _) = get(&h.router).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_full_size_data_uri_is_accepted() {
    let h = harness();
    let prefix = "data:image/jpeg;base64,";
    let uri = format!("{}{}", prefix, "A".repeat(8 * 1024 * 1024 - prefix.len()));

    let (status, body) = post(&h.router, json!({ "data_uri": uri }).to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stored_length"], json!(8 * 1024 * 1024));
}

#[tokio::test]
async fn test_query_before_ingest() {
    let h = harness();

    let (status, body) = get(&h.router).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "No data_uri is available", "status": "failed" })
    );
    assert_eq!(h.describer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.searcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_query_returns_normalized_items() {
    let h = harness();
    post(&h.router, json!({ "data_uri": "data:image/png;base64,AAAA" }).to_string()).await;

    let (status, body) = get(&h.router).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "ok",
            "items": [{
                "seller": "Acme",
                "product_name": "Mug",
                "image": "u",
                "price": 9.99,
                "rating": 4.5,
                "location": "NY"
            }]
        })
    );
}

#[tokio::test]
async fn test_query_not_found() {
    let h = harness_with(1024, Ok("mystery object".to_string()), Err(SearchError::NotFound));
    post(&h.router, r#"{"data_uri":"data:x"}"#).await;

    let (status, body) = get(&h.router).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "No products found", "status": "failed" }));
}

#[tokio::test]
async fn test_vision_failure_maps_to_bad_gateway() {
    let h = harness_with(
        1024,
        Err(UpstreamError::Unavailable(
            "authentication rejected (401): invalid token".to_string(),
        )),
        Ok(mug_listing()),
    );
    post(&h.router, r#"{"data_uri":"data:x"}"#).await;

    let (status, body) = get(&h.router).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], json!("failed"));
    assert!(body["error"].as_str().unwrap().starts_with("Description failed"));
    assert_eq!(h.searcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_timeout_maps_to_gateway_timeout() {
    let h = harness_with(
        1024,
        Ok("mug".to_string()),
        Err(SearchError::Upstream(UpstreamError::Timeout(
            "operation timed out".to_string(),
        ))),
    );
    post(&h.router, r#"{"data_uri":"data:x"}"#).await;

    let (status, body) = get(&h.router).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["status"], json!("failed"));
}

#[tokio::test]
async fn test_second_ingest_replaces_first() {
    let h = harness();
    post(&h.router, r#"{"data_uri":"data:first"}"#).await;
    post(&h.router, r#"{"data_uri":"data:second"}"#).await;

    get(&h.router).await;
    get(&h.router).await;

    assert_eq!(
        *h.describer.seen.lock().unwrap(),
        vec!["data:second".to_string(), "data:second".to_string()]
    );
    assert_eq!(h.searcher.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let h = harness();
    post(&h.router, r#"{"data_uri":"data:x"}"#).await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("ingest_requests_total"));
}

#[tokio::test]
async fn test_search_without_trailing_slash() {
    let h = harness();

    let request = Request::builder()
        .method("POST")
        .uri("/search")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"data_uri":"data:x"}"#))
        .unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stored_length"], json!(6));

    let request = Request::builder()
        .method("GET")
        .uri("/search")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"][0]["seller"], json!("Acme"));
}
