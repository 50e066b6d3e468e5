// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Challenge and reward routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::challenges::{self, ActivitySnapshot, ChallengeStatus};
use crate::services::rewards::{self, RewardStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/challenges", get(list_challenges))
        .route("/api/challenges/{id}/claim", post(claim_challenge))
        .route("/api/rewards", get(list_rewards))
        .route("/api/rewards/{id}/redeem", post(redeem_reward))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChallengesResponse {
    pub points: u32,
    pub challenges: Vec<ChallengeStatus>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RewardsResponse {
    pub points: u32,
    pub rewards: Vec<RewardStatus>,
}

/// Outcome of a claim or redemption.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub id: String,
    pub points_changed: i64,
    pub points: u32,
}

async fn load_user(state: &AppState, auth: &AuthUser) -> Result<crate::models::User> {
    state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))
}

async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ChallengesResponse>> {
    let today = chrono::Utc::now().date_naive();
    let user = load_user(&state, &auth).await?;
    let snapshot = ActivitySnapshot::load(&state.db, &user, today).await?;

    Ok(Json(ChallengesResponse {
        points: user.points,
        challenges: challenges::statuses(&user, &snapshot, today),
    }))
}

/// Claim a completed challenge once per period.
async fn claim_challenge(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>> {
    let challenge = challenges::find(&id)
        .ok_or_else(|| AppError::NotFound(format!("Challenge {} not found", id)))?;

    let today = chrono::Utc::now().date_naive();
    let user = load_user(&state, &auth).await?;
    let snapshot = ActivitySnapshot::load(&state.db, &user, today).await?;

    let points = state
        .db
        .update_user_atomic(&auth.user_id, |user| {
            challenges::claim(user, challenge, &snapshot, today)
        })
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        challenge = challenge.id,
        awarded = challenge.points,
        balance = points,
        "Challenge claimed"
    );

    Ok(Json(PointsResponse {
        id,
        points_changed: challenge.points as i64,
        points,
    }))
}

async fn list_rewards(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<RewardsResponse>> {
    let user = load_user(&state, &auth).await?;
    Ok(Json(RewardsResponse {
        points: user.points,
        rewards: rewards::statuses(&user),
    }))
}

/// Spend points on a reward.
async fn redeem_reward(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PointsResponse>> {
    let reward =
        rewards::find(&id).ok_or_else(|| AppError::NotFound(format!("Reward {} not found", id)))?;

    let points = state
        .db
        .update_user_atomic(&auth.user_id, |user| rewards::redeem(user, reward))
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        reward = reward.id,
        cost = reward.cost,
        balance = points,
        "Reward redeemed"
    );

    Ok(Json(PointsResponse {
        id,
        points_changed: -(reward.cost as i64),
        points,
    }))
}
