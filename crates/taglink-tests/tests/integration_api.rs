// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # API Integration Tests
//!
//! Drives the REST router in-process against the simulator.
//!
//! ## Test Categories
//!
//! - `test_tags_*`: `GET /tags`, `POST /tag`
//! - `test_tag_*`: `GET`, `PUT` and `DELETE /tag/{id}`
//! - `test_service_*`: health, metrics and routing

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value as Json};
use taglink_api::{ApiServer, AppState};
use taglink_core::{Simulator, TagConnection};
use taglink_tests::common::{init_test_logging, simulator_connection};
use tower::ServiceExt;

// =============================================================================
// Test Helpers
// =============================================================================

struct TestApi {
    sim: Simulator,
    conn: Arc<dyn TagConnection>,
    router: Router,
}

async fn test_api(tags: &[&str], read_only: bool) -> TestApi {
    init_test_logging();
    let sim = Simulator::new();
    let conn = simulator_connection(&sim, tags).await;
    let router = ApiServer::new(AppState::new(conn.clone()).with_read_only(read_only)).router();
    TestApi { sim, conn, router }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Json) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Json::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn with_json(builder: axum::http::request::Builder, body: &str) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    with_json(Request::post(uri), body)
}

fn put(uri: &str, body: &str) -> Request<Body> {
    with_json(Request::put(uri), body)
}

// =============================================================================
// Collection
// =============================================================================

#[tokio::test]
async fn test_tags_empty_object() {
    let api = test_api(&[], false).await;
    let (status, body) = send(&api.router, get("/tags")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_tags_lists_items() {
    let api = test_api(&["storage.numeric.reg01", "boolean.toggle"], false).await;
    let (status, body) = send(&api.router, get("/tags")).await;

    assert_eq!(status, StatusCode::OK);
    let items = body.as_object().unwrap();
    assert_eq!(items.len(), 2);

    let reg = &items["storage.numeric.reg01"];
    assert_eq!(reg["value"], json!(0.0));
    assert_eq!(reg["quality"], json!(192));
    assert!(reg["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_tags_create() {
    let api = test_api(&[], false).await;
    let (status, body) = send(
        &api.router,
        post("/tag", r#"["numeric.sin.float", "text.clock"]"#),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"result": "created"}));
    assert_eq!(api.conn.tags().await.len(), 2);
}

#[tokio::test]
async fn test_tags_create_unknown_tag() {
    let api = test_api(&[], false).await;
    let (status, body) = send(
        &api.router,
        post("/tag", r#"["numeric.sin.float", "no.such.tag"]"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Did not add tags"}));
    // The good tag is still subscribed.
    assert_eq!(api.conn.tags().await, vec!["numeric.sin.float"]);
}

#[tokio::test]
async fn test_tags_create_bad_payload() {
    let api = test_api(&[], false).await;

    for payload in [r#"{"tag": "x"}"#, "not json", r#"[1, 2]"#] {
        let (status, body) = send(&api.router, post("/tag", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body, json!({"error": "Invalid request payload"}));
    }
}

// =============================================================================
// Single Tag
// =============================================================================

#[tokio::test]
async fn test_tag_get() {
    let api = test_api(&["storage.bool.reg02"], false).await;
    let (status, body) = send(&api.router, get("/tag/storage.bool.reg02")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], json!(false));
    assert_eq!(body["quality"], json!(192));
}

#[tokio::test]
async fn test_tag_get_unsubscribed() {
    let api = test_api(&[], false).await;
    let (status, body) = send(&api.router, get("/tag/storage.bool.reg02")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "tag not found"}));
}

#[tokio::test]
async fn test_tag_put_then_get() {
    let api = test_api(&["storage.numeric.reg07"], false).await;

    let (status, body) = send(&api.router, put("/tag/storage.numeric.reg07", "12.5")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "updated"}));

    let (_, body) = send(&api.router, get("/tag/storage.numeric.reg07")).await;
    assert_eq!(body["value"], json!(12.5));
}

#[tokio::test]
async fn test_tag_put_string() {
    let api = test_api(&["storage.string.reg01"], false).await;

    let (status, _) = send(&api.router, put("/tag/storage.string.reg01", r#""pump on""#)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&api.router, get("/tag/storage.string.reg01")).await;
    assert_eq!(body["value"], json!("pump on"));
}

#[tokio::test]
async fn test_tag_put_unsubscribed() {
    let api = test_api(&[], false).await;
    let (status, body) = send(&api.router, put("/tag/storage.numeric.reg01", "1")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "tag not found"}));
}

#[tokio::test]
async fn test_tag_put_invalid_payload() {
    let api = test_api(&["storage.numeric.reg01"], false).await;

    for payload in ["null", "[1]", r#"{"v": 1}"#, "nope"] {
        let (status, body) = send(&api.router, put("/tag/storage.numeric.reg01", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body, json!({"error": "Invalid request payload"}));
    }
}

#[tokio::test]
async fn test_tag_put_denied_by_server() {
    let api = test_api(&["numeric.sin.float"], false).await;
    let (status, body) = send(&api.router, put("/tag/numeric.sin.float", "3.0")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_tag_put_read_only() {
    let api = test_api(&["storage.numeric.reg01"], true).await;
    let (status, body) = send(&api.router, put("/tag/storage.numeric.reg01", "5")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "read-only"}));

    let (_, body) = send(&api.router, get("/tag/storage.numeric.reg01")).await;
    assert_eq!(body["value"], json!(0.0));
}

#[tokio::test]
async fn test_tag_delete() {
    let api = test_api(&["numeric.sin.float", "boolean.toggle"], false).await;

    let (status, body) = send(&api.router, delete("/tag/numeric.sin.float")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "deleted"}));
    assert_eq!(api.conn.tags().await, vec!["boolean.toggle"]);
    assert_eq!(api.sim.item_count(), 1);

    // Unknown tags delete cleanly too.
    let (status, _) = send(&api.router, delete("/tag/never.added")).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Service
// =============================================================================

#[tokio::test]
async fn test_service_health() {
    let api = test_api(&[], false).await;
    let (status, body) = send(&api.router, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["connected"], json!(true));
    assert_eq!(body["version"], json!(taglink_api::VERSION));
}

#[tokio::test]
async fn test_service_health_after_outage() {
    let api = test_api(&[], false).await;
    api.sim.go_down();

    let (status, body) = send(&api.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], json!(false));
}

#[tokio::test]
async fn test_service_health_while_reconnecting() {
    let api = test_api(&["numeric.sin.float"], false).await;
    api.sim.go_down();

    let conn = Arc::clone(&api.conn);
    let healing = tokio::spawn(async move { conn.read().await });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let (status, body) = tokio::time::timeout(
        std::time::Duration::from_millis(500),
        send(&api.router, get("/health")),
    )
    .await
    .expect("/health waited for the reconnect");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], json!(false));

    api.sim.come_up();
    healing.await.unwrap();
    let (_, body) = send(&api.router, get("/health")).await;
    assert_eq!(body["connected"], json!(true));
}

#[tokio::test]
async fn test_service_metrics() {
    let api = test_api(&[], false).await;
    let response = api.router.clone().oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_service_unknown_route() {
    let api = test_api(&[], false).await;
    let response = api.router.clone().oneshot(get("/tagz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_wrong_method() {
    let api = test_api(&[], false).await;
    let response = api.router.clone().oneshot(delete("/tags")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
