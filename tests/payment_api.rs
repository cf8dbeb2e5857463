//! Integration tests for the premium upgrade flow.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::json;
use tollgate::auth::SESSION_COOKIE;
use tollgate::signing::hmac_sha256_hex;
use tollgate::store::{ApiKeyRecord, LedgerStore, Plan, UserRecord};
use tower::Service;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn verify_request(order_id: &str, payment_id: &str, signature: &str) -> Request<Body> {
    let body = json!({
        "order_id": order_id,
        "payment_id": payment_id,
        "signature": signature,
    });
    Request::builder()
        .method("POST")
        .uri("/verify-payment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn signature_for(order_id: &str, payment_id: &str) -> String {
    hmac_sha256_hex(
        PAYMENT_SECRET.as_bytes(),
        &format!("{}|{}", order_id, payment_id),
    )
}

#[tokio::test]
async fn test_verify_payment_rejects_bad_signature() {
    let upstream = MockServer::start().await;
    let (mut app, _state, store) = make_app(test_config(&upstream));

    let response = app
        .call(verify_request("order_1", "pay_1", "deadbeef"))
        .await
        .unwrap();

    // Mismatch is an in-band failure, not an HTTP error.
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(store
        .transactions_for_owner("owner-1")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_verify_payment_applies_upgrade() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_1",
            "status": "captured",
            "notes": { "owner_id": "owner-1" }
        })))
        .mount(&upstream)
        .await;

    let (mut app, _state, store) = make_app(test_config(&upstream));
    store.seed_key(ApiKeyRecord::new_trial("owner-1", "k1", 1));

    let response = app
        .call(verify_request("order_1", "pay_1", &signature_for("order_1", "pay_1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let record = store.find_key("k1").await.unwrap().unwrap();
    assert_eq!(record.plan, Plan::Premium);
    assert_eq!(record.credits, 1000);

    let transactions = store.transactions_for_owner("owner-1").await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction_id, "pay_1");
    assert_eq!(transactions[0].status, "captured");
}

#[tokio::test]
async fn test_verify_payment_replay_is_idempotent() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/payments/pay_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pay_1",
            "status": "captured",
            "notes": { "owner_id": "owner-1" }
        })))
        .mount(&upstream)
        .await;

    let (mut app, _state, store) = make_app(test_config(&upstream));
    store.seed_key(ApiKeyRecord::new_trial("owner-1", "k1", 1));

    let signature = signature_for("order_1", "pay_1");
    for _ in 0..2 {
        let response = app
            .call(verify_request("order_1", "pay_1", &signature))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);
    }

    // One transaction row despite the replayed callback.
    let transactions = store.transactions_for_owner("owner-1").await.unwrap();
    assert_eq!(transactions.len(), 1);
}

#[tokio::test]
async fn test_create_order_requires_session() {
    let upstream = MockServer::start().await;
    let (mut app, _state, _store) = make_app(test_config(&upstream));

    let request = Request::builder()
        .method("POST")
        .uri("/create-order")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_order_returns_gateway_order() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "order_42",
            "amount": 49900,
            "currency": "INR"
        })))
        .expect(1)
        .mount(&upstream)
        .await;

    let (mut app, state, store) = make_app(test_config(&upstream));
    store.seed_key(ApiKeyRecord::new_trial("owner-1", "k1", 2));
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

    let request = Request::builder()
        .method("POST")
        .uri("/create-order")
        .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session_id))
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["order_id"], "order_42");
    assert_eq!(body["amount"], 49900);
    assert_eq!(body["key_id"], "rzp_test");
}

#[tokio::test]
async fn test_create_order_conflicts_when_already_premium() {
    let upstream = MockServer::start().await;
    let (mut app, state, store) = make_app(test_config(&upstream));

    let mut record = ApiKeyRecord::new_trial("owner-1", "k1", 1000);
    record.plan = Plan::Premium;
    store.seed_key(record);
    let session_id = state.sessions.create("owner-1");

    let request = Request::builder()
        .method("POST")
        .uri("/create-order")
        .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session_id))
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "already_premium");
}
