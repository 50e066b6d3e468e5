// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use clarity::error::AppError;

async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_client_errors_carry_details() {
    let cases = [
        (AppError::Forbidden("nope".to_string()), StatusCode::FORBIDDEN, "forbidden"),
        (AppError::NotFound("Workout w1 not found".to_string()), StatusCode::NOT_FOUND, "not_found"),
        (AppError::BadRequest("bad date".to_string()), StatusCode::BAD_REQUEST, "bad_request"),
        (AppError::Conflict("Username already taken".to_string()), StatusCode::CONFLICT, "conflict"),
    ];

    for (err, status, code) in cases {
        let (got_status, body) = render(err).await;
        assert_eq!(got_status, status);
        assert_eq!(body["error"], code);
        assert!(body["details"].is_string());
    }
}

#[tokio::test]
async fn test_premium_required_is_402() {
    let (status, body) = render(AppError::PremiumRequired).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"], "premium_required");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_server_errors_hide_details() {
    let (status, body) = render(AppError::Stripe("card_declined: secret info".to_string())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "stripe_error");
    assert!(body.get("details").is_none());

    let (status, body) = render(AppError::Database("connection reset".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "database_error");
    assert!(body.get("details").is_none());

    let (status, body) = render(AppError::Internal(anyhow::anyhow!("boom"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn test_auth_errors_are_401() {
    let (status, body) = render(AppError::Unauthorized).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = render(AppError::InvalidToken).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[test]
fn test_validation_errors_map_to_bad_request() {
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(min = 1))]
        minutes: i64,
    }

    let err: AppError = Sample { minutes: 0 }.validate().unwrap_err().into();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}
