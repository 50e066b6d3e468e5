// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stripe webhook receiver.

use crate::error::{AppError, Result};
use crate::models::{SubscriptionStatus, User};
use crate::services::stripe::{
    verify_webhook_signature, CompletedCheckout, StripeEvent, CHECKOUT_COMPLETED,
};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::collections::HashMap;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/stripe", post(handle_event))
}

/// Handle a signed Stripe event.
///
/// The raw body is needed for signature verification, so it is parsed only
/// after the signature checks out. Unhandled event types are acknowledged.
async fn handle_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let now = chrono::Utc::now().timestamp();
    verify_webhook_signature(&body, signature, &state.config.stripe_webhook_secret, now).map_err(
        |e| {
            tracing::warn!(error = %e, "Security Alert: Stripe webhook signature rejected");
            AppError::BadRequest(format!("Invalid signature: {}", e))
        },
    )?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid event payload: {}", e)))?;

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Stripe event received");

    if event.event_type != CHECKOUT_COMPLETED {
        return Ok(StatusCode::OK);
    }

    let checkout: CompletedCheckout = serde_json::from_value(event.data.object)
        .map_err(|e| AppError::BadRequest(format!("Invalid checkout session: {}", e)))?;

    let Some(user_id) = checkout.user_id().map(str::to_string) else {
        tracing::warn!(session_id = %checkout.id, "Checkout completed without a user id");
        return Ok(StatusCode::OK);
    };

    activate_premium(&state, &user_id, checkout.customer).await?;
    Ok(StatusCode::OK)
}

/// Mark a user premium, creating a bare user document if none exists.
///
/// Existing users are updated in a transaction so concurrent point changes
/// on the same document are kept.
async fn activate_premium(
    state: &AppState,
    user_id: &str,
    customer: Option<String>,
) -> Result<()> {
    let upgraded = state
        .db
        .update_user_atomic(user_id, |user| {
            user.subscription_status = SubscriptionStatus::Premium;
            if let Some(customer) = &customer {
                user.stripe_customer_id = Some(customer.clone());
            }
            Ok(())
        })
        .await;

    match upgraded {
        Ok(()) => {}
        Err(AppError::NotFound(_)) => {
            tracing::warn!(user_id, "Premium purchase for unknown user, creating document");
            let now = chrono::Utc::now();
            let user = User {
                id: user_id.to_string(),
                username: String::new(),
                email: String::new(),
                hashed_password: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                exercise_goal_minutes: None,
                water_goal_oz: None,
                meditation_goal_minutes: None,
                subscription_status: SubscriptionStatus::Premium,
                trial_start_date: None,
                trial_end_date: None,
                stripe_customer_id: customer,
                points: 0,
                challenges: HashMap::new(),
                unlocked_rewards: Vec::new(),
                created_at: now,
                updated_at: now,
            };
            state.db.upsert_user(&user).await?;
        }
        Err(e) => return Err(e),
    }

    tracing::info!(user_id, "User upgraded to premium");
    Ok(())
}
