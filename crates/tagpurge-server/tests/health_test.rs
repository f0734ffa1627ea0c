mod helpers;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use helpers::MockBackend;
use tagpurge_core::TagHasher;
use tagpurge_server::metrics::setup::detached_handle;
use tagpurge_server::{AppState, create_router_with_state};
use tower::ServiceExt;

fn router() -> axum::Router {
    let state = AppState::new(Arc::new(MockBackend::valid()), TagHasher::default());
    create_router_with_state(state, detached_handle().unwrap())
}

#[tokio::test]
async fn health_check_returns_200() {
    let app = router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_check_body_contains_status_up() {
    let app = router();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("application/json"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "UP");
}

#[test]
fn health_response_serializes_correctly() {
    use tagpurge_server::HealthResponse;

    let response = HealthResponse::default();
    let json = serde_json::to_string(&response).unwrap();

    assert_eq!(json, r#"{"status":"UP"}"#);
}
