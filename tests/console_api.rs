//! Integration tests for the console surface: key issuing, dashboard
//! caching, and the OAuth entry points.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use std::time::Duration;
use tollgate::store::{ApiKeyRecord, LedgerStore, UserRecord};
use tower::Service;
use wiremock::MockServer;

#[tokio::test]
async fn test_generate_api_key_requires_session() {
    let upstream = MockServer::start().await;
    let (mut app, _state, _store) = make_app(test_config(&upstream));

    let request = Request::builder()
        .uri("/generate-api-key")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_generate_api_key_issues_trial_key() {
    let upstream = MockServer::start().await;
    let (mut app, state, store) = make_app(test_config(&upstream));
    let session_id = state.sessions.create("owner-1");

    let response = app
        .call(get_with_session("/generate-api-key", &session_id))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["credits"], 5);

    let issued = body["api_key"].as_str().unwrap().to_string();
    let record = store.find_key(&issued).await.unwrap().unwrap();
    assert_eq!(record.owner_id, "owner-1");
    assert_eq!(record.credits, 5);
}

#[tokio::test]
async fn test_second_key_for_same_owner_conflicts() {
    let upstream = MockServer::start().await;
    let (mut app, state, store) = make_app(test_config(&upstream));
    store.seed_key(ApiKeyRecord::new_trial("owner-1", "k1", 5));
    let session_id = state.sessions.create("owner-1");

    let response = app
        .call(get_with_session("/generate-api-key", &session_id))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "key_exists");
}

#[tokio::test]
async fn test_dashboard_serves_cached_view_until_ttl() {
    let upstream = MockServer::start().await;
    let mut config = test_config(&upstream);
    config.cache.dashboard_ttl_seconds = 1;

    let (mut app, state, store) = make_app(config);
    store.seed_key(ApiKeyRecord::new_trial("owner-1", "k1", 5));
    store
        .upsert_user(UserRecord {
            owner_id: "owner-1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            picture: None,
        })
        .await
        .unwrap();
    let session_id = state.sessions.create("owner-1");

    let first = app
        .call(get_with_session("/dashboard", &session_id))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_json(first).await["key"]["credits"], 5);

    // Mutate the store underneath the cache.
    store.set_credits("k1", 1);

    let cached = app
        .call(get_with_session("/dashboard", &session_id))
        .await
        .unwrap();
    assert_eq!(body_json(cached).await["key"]["credits"], 5);

    // Past the TTL the next read reflects the store again.
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    let fresh = app
        .call(get_with_session("/dashboard", &session_id))
        .await
        .unwrap();
    assert_eq!(body_json(fresh).await["key"]["credits"], 1);
}

#[tokio::test]
async fn test_root_banner_for_anonymous_visitors() {
    let upstream = MockServer::start().await;
    let (mut app, _state, _store) = make_app(test_config(&upstream));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "tollgate");
    assert_eq!(body["sign_in"], "/auth/google");
}

#[tokio::test]
async fn test_root_redirects_signed_in_visitors() {
    let upstream = MockServer::start().await;
    let (mut app, state, _store) = make_app(test_config(&upstream));
    let session_id = state.sessions.create("owner-1");

    let response = app
        .call(get_with_session("/", &session_id))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
}

#[tokio::test]
async fn test_login_redirects_to_provider_with_state() {
    let upstream = MockServer::start().await;
    let (mut app, _state, _store) = make_app(test_config(&upstream));

    let request = Request::builder()
        .uri("/auth/google")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains("client_id=client-1"));
    assert!(location.contains("state="));
}

#[tokio::test]
async fn test_callback_rejects_forged_state() {
    let upstream = MockServer::start().await;
    let (mut app, _state, _store) = make_app(test_config(&upstream));

    let request = Request::builder()
        .uri("/auth/google/callback?code=abc&state=forged")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let upstream = MockServer::start().await;
    let (mut app, state, _store) = make_app(test_config(&upstream));
    let session_id = state.sessions.create("owner-1");

    let response = app
        .call(get_with_session("/logout", &session_id))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.sessions.resolve(&session_id).is_none());

    // The cleared cookie means the next root visit sees the banner.
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let after = app.call(request).await.unwrap();
    assert_eq!(after.status(), StatusCode::OK);
}
