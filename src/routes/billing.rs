// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription status and Stripe Checkout (`/api/billing`).

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{SubscriptionStatus, SubscriptionView};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/billing/subscription", get(get_subscription))
        .route("/api/billing/checkout", post(create_checkout))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SubscriptionView>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
    Ok(Json(user.subscription_view(chrono::Utc::now())))
}

/// Start a Checkout session for the premium plan.
///
/// The upgrade itself happens when Stripe calls the webhook.
async fn create_checkout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<CheckoutResponse>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;

    if user.subscription_status == SubscriptionStatus::Premium {
        return Err(AppError::Conflict(
            "Already subscribed to premium".to_string(),
        ));
    }

    let session = state.stripe.create_checkout_session(&user).await?;
    Ok(Json(CheckoutResponse {
        session_id: session.id,
        url: session.url,
    }))
}
