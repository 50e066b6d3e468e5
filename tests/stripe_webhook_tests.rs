// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe webhook endpoint tests.
//!
//! Signature checks happen before any database access, so these run
//! against the offline mock.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use clarity::services::stripe::signature_header;
use tower::ServiceExt;

mod common;

const PAYLOAD: &str = r#"{"id":"evt_test_1","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;

fn webhook_request(payload: &str, signature: Option<String>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[tokio::test]
async fn test_missing_signature_rejected() {
    let (app, _) = common::create_test_app();

    let response = app.oneshot(webhook_request(PAYLOAD, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let (app, _) = common::create_test_app();
    let header = signature_header("whsec_attacker", now(), PAYLOAD.as_bytes()).unwrap();

    let response = app
        .oneshot(webhook_request(PAYLOAD, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = common::body_json(response).await;
    assert!(body["details"].as_str().unwrap().contains("signature"));
}

#[tokio::test]
async fn test_tampered_payload_rejected() {
    let (app, state) = common::create_test_app();
    let header = signature_header(
        &state.config.stripe_webhook_secret,
        now(),
        PAYLOAD.as_bytes(),
    )
    .unwrap();
    let tampered = PAYLOAD.replace("cus_1", "cus_2");

    let response = app
        .oneshot(webhook_request(&tampered, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stale_timestamp_rejected() {
    let (app, state) = common::create_test_app();
    let header = signature_header(
        &state.config.stripe_webhook_secret,
        now() - 3600,
        PAYLOAD.as_bytes(),
    )
    .unwrap();

    let response = app
        .oneshot(webhook_request(PAYLOAD, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unhandled_event_acknowledged() {
    let (app, state) = common::create_test_app();
    let header = signature_header(
        &state.config.stripe_webhook_secret,
        now(),
        PAYLOAD.as_bytes(),
    )
    .unwrap();

    let response = app
        .oneshot(webhook_request(PAYLOAD, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_without_user_acknowledged() {
    let (app, state) = common::create_test_app();
    let payload = r#"{"id":"evt_test_2","type":"checkout.session.completed","data":{"object":{"id":"cs_1","customer":"cus_1"}}}"#;
    let header = signature_header(
        &state.config.stripe_webhook_secret,
        now(),
        payload.as_bytes(),
    )
    .unwrap();

    let response = app
        .oneshot(webhook_request(payload, Some(header)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_checkout_for_user_needs_database() {
    let (app, state) = common::create_test_app();
    let payload = r#"{"id":"evt_test_3","type":"checkout.session.completed","data":{"object":{"id":"cs_2","client_reference_id":"u1"}}}"#;
    let header = signature_header(
        &state.config.stripe_webhook_secret,
        now(),
        payload.as_bytes(),
    )
    .unwrap();

    let response = app
        .oneshot(webhook_request(payload, Some(header)))
        .await
        .unwrap();

    // Signature accepted; activation fails on the offline database so Stripe retries
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
