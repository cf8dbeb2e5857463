//! Shared test utilities for Tollgate integration tests.
//!
//! Builds a router whose upstream clients (model, media host, payment
//! gateway, identity provider) all point at one wiremock server, with an
//! in-memory ledger store the tests can seed and inspect.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request};
use serde_json::{json, Value};
use std::sync::Arc;
use tollgate::api::{create_router, AppState};
use tollgate::auth::SESSION_COOKIE;
use tollgate::config::TollgateConfig;
use tollgate::store::{LedgerStore, MemoryStore};
use wiremock::MockServer;

/// Secrets wired into the test config; signature tests recompute digests
/// with these.
pub const PAYMENT_SECRET: &str = "payment-secret";
pub const MEDIA_SECRET: &str = "media-secret";

/// Config with every upstream pointed at the mock server.
pub fn test_config(upstream: &MockServer) -> TollgateConfig {
    let uri = upstream.uri();
    let mut config = TollgateConfig::default();
    config.genai.base_url = uri.clone();
    config.genai.api_key = "genai-key".to_string();
    config.media.base_url = uri.clone();
    config.media.cloud_name = "testcloud".to_string();
    config.media.api_key = "media-key".to_string();
    config.media.api_secret = MEDIA_SECRET.to_string();
    config.payment.base_url = uri.clone();
    config.payment.key_id = "rzp_test".to_string();
    config.payment.key_secret = PAYMENT_SECRET.to_string();
    config.oauth.auth_url = format!("{}/o/oauth2/auth", uri);
    config.oauth.token_url = format!("{}/token", uri);
    config.oauth.userinfo_url = format!("{}/userinfo", uri);
    config.oauth.client_id = "client-1".to_string();
    config.oauth.client_secret = "oauth-secret".to_string();
    config
}

/// Router plus the state and store behind it, for seeding and inspection.
pub fn make_app(config: TollgateConfig) -> (axum::Router, Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn LedgerStore> = store.clone();
    let state = Arc::new(AppState::new(Arc::new(config), dyn_store));
    (create_router(Arc::clone(&state)), state, store)
}

/// `generateContent` response carrying a single text part.
pub fn text_model_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    })
}

/// `generateContent` response carrying one base64 inline-data part.
pub fn inline_data_response(mime_type: &str, base64_data: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{
                "inlineData": { "mimeType": mime_type, "data": base64_data }
            }] }
        }]
    })
}

/// Media host upload response.
pub fn upload_response(secure_url: &str) -> Value {
    json!({ "secure_url": secure_url })
}

/// Empty-body request against a generation route.
pub fn generation_request(path_and_query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path_and_query)
        .body(Body::empty())
        .unwrap()
}

/// GET request carrying a session cookie.
pub fn get_with_session(uri: &str, session_id: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session_id))
        .body(Body::empty())
        .unwrap()
}

/// Read a response body to bytes.
pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
