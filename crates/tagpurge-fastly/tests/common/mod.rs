#![allow(dead_code)]
use serde_json::json;
use tagpurge_core::PurgeMethod;
use tagpurge_fastly::{FastlyApi, FastlyConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-token";
pub const SERVICE_ID: &str = "svc123";

/// Builds a client pointed at the mock server.
pub fn api(server: &MockServer) -> FastlyApi {
    api_with_method(server, PurgeMethod::Instant)
}

pub fn api_with_method(server: &MockServer, purge_method: PurgeMethod) -> FastlyApi {
    let config = FastlyConfig::builder()
        .api_url(server.uri())
        .api_key(API_KEY)
        .service_id(SERVICE_ID)
        .purge_method(purge_method)
        .build()
        .expect("valid test config");
    FastlyApi::new(config).expect("client builds")
}

/// Mounts a `/tokens/self` response with the given scope string.
pub async fn mount_token(server: &MockServer, scope: &str) {
    Mock::given(method("GET"))
        .and(path("/tokens/self"))
        .and(header("Fastly-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "token-id",
            "scope": scope,
            "services": [],
        })))
        .mount(server)
        .await;
}

/// Mounts a `/current_user` response with the given role.
pub async fn mount_user(server: &MockServer, role: &str) {
    Mock::given(method("GET"))
        .and(path("/current_user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "user-id",
            "login": "ops@example.com",
            "role": role,
        })))
        .mount(server)
        .await;
}

/// Mounts a successful `purge_all` for the test service.
pub async fn mount_purge_all(server: &MockServer, status: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/service/{}/purge_all", SERVICE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })))
        .mount(server)
        .await;
}

/// Mounts a successful surrogate key purge for the test service.
pub async fn mount_purge_keys(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(format!("/service/{}/purge", SERVICE_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}
