//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlite_file_cache::{api::create_router, AppState, CacheConfig, FileCache};
use std::thread::sleep;
use std::time::Duration;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let cache = FileCache::in_memory(CacheConfig::default()).unwrap();
    create_router(AppState::new(cache))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == SET / GET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "test_key", "value": "test_value"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["message"].as_str().unwrap().contains("test_key"));
}

#[tokio::test]
async fn test_get_endpoint_returns_structured_value() {
    let app = create_test_app();
    let value = json!({"name": "widget", "tags": ["a", "b"], "count": 3});

    let (status, _) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "get_key", "value": value, "ttl": 60})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "GET", "/get/get_key", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["key"], "get_key");
    assert_eq!(json["value"], value);
}

#[tokio::test]
async fn test_null_value_is_a_hit() {
    let app = create_test_app();

    send(&app, "PUT", "/set", Some(json!({"key": "nothing", "value": null}))).await;

    let (status, json) = send(&app, "GET", "/get/nothing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["value"].is_null());
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/get/nonexistent", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json.get("error").is_some());
}

// == ADD / TOUCH / HAS / DELETE Endpoint Tests ==

#[tokio::test]
async fn test_add_endpoint() {
    let app = create_test_app();
    let body = json!({"key": "once", "value": 1});

    let (_, first) = send(&app, "POST", "/add", Some(body.clone())).await;
    let (_, second) = send(&app, "POST", "/add", Some(json!({"key": "once", "value": 2}))).await;

    assert_eq!(first["added"], true);
    assert_eq!(second["added"], false);

    let (_, json) = send(&app, "GET", "/get/once", None).await;
    assert_eq!(json["value"], 1);
}

#[tokio::test]
async fn test_touch_endpoint() {
    let app = create_test_app();

    let (_, missing) = send(&app, "POST", "/touch/absent", Some(json!({}))).await;
    assert_eq!(missing["touched"], false);

    send(&app, "PUT", "/set", Some(json!({"key": "t", "value": "v", "ttl": 1}))).await;
    let (status, json) = send(&app, "POST", "/touch/t", Some(json!({"never": true}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["touched"], true);

    sleep(Duration::from_millis(1100));
    let (status, _) = send(&app, "GET", "/get/t", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_has_and_delete_endpoints() {
    let app = create_test_app();
    send(&app, "PUT", "/set", Some(json!({"key": "d", "value": "v"}))).await;

    let (_, has) = send(&app, "GET", "/has/d", None).await;
    assert_eq!(has["present"], true);

    let (status, deleted) = send(&app, "DELETE", "/del/d", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["deleted"], true);

    let (_, again) = send(&app, "DELETE", "/del/d", None).await;
    assert_eq!(again["deleted"], false);

    let (_, has) = send(&app, "GET", "/has/d", None).await;
    assert_eq!(has["present"], false);
}

// == Batch Endpoint Tests ==

#[tokio::test]
async fn test_batch_endpoints() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "PUT",
        "/set_many",
        Some(json!({"items": {"a": 1, "b": 2, "c": 3}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["failed"], json!([]));

    let (_, json) = send(
        &app,
        "POST",
        "/get_many",
        Some(json!({"keys": ["a", "c", "zzz"]})),
    )
    .await;
    assert_eq!(json["values"], json!({"a": 1, "c": 3}));

    let (_, json) = send(
        &app,
        "POST",
        "/delete_many",
        Some(json!({"keys": ["a", "b", "zzz"]})),
    )
    .await;
    assert_eq!(json["deleted"], 2);

    let (_, json) = send(&app, "POST", "/get_many", Some(json!({"keys": []}))).await;
    assert_eq!(json["values"], json!({}));
}

// == CLEAR / STATS / HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_clear_and_stats_endpoints() {
    let app = create_test_app();
    send(&app, "PUT", "/set", Some(json!({"key": "x", "value": 1}))).await;
    send(&app, "GET", "/get/x", None).await;
    send(&app, "GET", "/get/missing", None).await;

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["hit_rate"], 0.5);

    let (status, _) = send(&app, "DELETE", "/clear", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(stats["total_entries"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Error Response Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/set")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"invalid json"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // Axum returns 400 or 422 for JSON parsing errors
    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app();

    let (status, json) = send(&app, "PUT", "/set", Some(json!({"key": "", "value": "test"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_oversized_key_request() {
    let app = create_test_app();
    let key = "k".repeat(300);

    let (status, json) = send(&app, "PUT", "/set", Some(json!({"key": key, "value": 1}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid key"));
}

// == TTL Expiration via API Tests ==

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "PUT",
        "/set",
        Some(json!({"key": "ttl_test", "value": "expires_soon", "ttl": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/get/ttl_test", None).await;
    assert_eq!(status, StatusCode::OK);

    sleep(Duration::from_millis(1100));

    let (status, _) = send(&app, "GET", "/get/ttl_test", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
