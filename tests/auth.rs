//! Tests for the POST /auth endpoint.
//!
//! /auth is the client's session check: it answers whether a key token is
//! currently good and how much time it has left, applying the lazy expiry
//! transition as a side effect.

use axum::{body::Body, http::Request};
use serde_json::{Value, json};
use tower::ServiceExt;

mod common;
use common::*;

async fn post_auth(app: axum::Router, body: Value) -> (axum::http::StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).expect("Response should be valid JSON");
    (status, json)
}

#[tokio::test]
async fn test_auth_with_valid_key_returns_plan_and_remaining_time() {
    let state = create_test_app_state();

    let token = {
        let conn = state.db.get().unwrap();
        // Created just now, so remainingTime is close to the full week
        create_test_key(&conn, Plan::Days7, now()).key
    };

    let app = public_app(state);
    let (status, json) = post_auth(app, json!({ "key": token.clone() })).await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["key"], token.as_str());
    assert_eq!(json["plan"], "7");

    let remaining = json["remainingTime"].as_i64().unwrap();
    assert!(remaining > 7 * 86400 - 60 && remaining <= 7 * 86400);
    assert!(json["expiresAt"].as_i64().unwrap() > now());
}

#[tokio::test]
async fn test_auth_unknown_key_returns_404() {
    let state = create_test_app_state();
    let app = public_app(state);

    let (status, json) = post_auth(app, json!({ "key": "does-not-exist" })).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Key not found");
}

#[tokio::test]
async fn test_auth_expired_key_returns_401_and_flips_status() {
    let state = create_test_app_state();

    let token = {
        let conn = state.db.get().unwrap();
        // Created two weeks ago on a 7-day plan, so it is past expiry but
        // still stored as active
        create_test_key(&conn, Plan::Days7, now() - 14 * 86400).key
    };

    let app = public_app(state.clone());
    let (status, json) = post_auth(app, json!({ "key": token.clone() })).await;

    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Key expired");

    let conn = state.db.get().unwrap();
    let row = queries::get_key(&conn, &token).unwrap().unwrap();
    assert_eq!(row.status, KeyStatus::Expired);
}

#[tokio::test]
async fn test_auth_disabled_key_returns_401() {
    let state = create_test_app_state();

    let token = {
        let conn = state.db.get().unwrap();
        let key = create_test_key(&conn, Plan::Days30, now());
        set_key_status(&conn, &key.key, "disabled");
        key.key
    };

    let app = public_app(state);
    let (status, json) = post_auth(app, json!({ "key": token })).await;

    assert_eq!(status, axum::http::StatusCode::UNAUTHORIZED);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Key is not active");
}

#[tokio::test]
async fn test_auth_missing_key_returns_400() {
    let state = create_test_app_state();
    let app = public_app(state);

    let (status, json) = post_auth(app, json!({})).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Missing key");
}

#[tokio::test]
async fn test_auth_blank_key_returns_400() {
    let state = create_test_app_state();
    let app = public_app(state);

    let (status, json) = post_auth(app, json!({ "key": "   " })).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Missing key");
}

#[tokio::test]
async fn test_auth_admin_key_reports_far_future_expiry() {
    let state = create_test_app_state();

    let token = {
        let conn = state.db.get().unwrap();
        queries::ensure_admin_key(&conn).unwrap().unwrap().key
    };

    let app = public_app(state);
    let (status, json) = post_auth(app, json!({ "key": token })).await;

    assert_eq!(status, axum::http::StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["plan"], "admin");
    assert_eq!(json["expiresAt"].as_i64().unwrap(), FAR_FUTURE);
    assert!(json["remainingTime"].as_i64().unwrap() > 0);
}
