// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meditation routes (`/api/meditations`), including premium insights.

use crate::error::{ApiJson, AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    Meditation, MeditationInsights, MeditationRequest, MeditationResponse, MeditationSummary,
};
use crate::routes::entries::{
    day_entries, fetch_owned, list_for_user, path_day, week_entries, DeletedResponse, RangeQuery,
};
use crate::time_utils::day_key;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/meditations/new", post(create_meditation))
        .route(
            "/api/meditations/{id}",
            get(get_meditation)
                .put(update_meditation)
                .delete(delete_meditation),
        )
        .route("/api/meditations/user/{user_id}", get(list_meditations))
        .route(
            "/api/meditations/user/{user_id}/date/{date}/summary",
            get(day_summary),
        )
        .route(
            "/api/meditations/user/{user_id}/week/{date}/summary",
            get(week_summary),
        )
        .route("/api/meditations/user/{user_id}/insights", get(insights))
}

async fn create_meditation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(req), _): ApiJson<MeditationRequest>,
) -> Result<(StatusCode, Json<MeditationResponse>)> {
    let meditation = req.into_meditation(&auth.user_id, chrono::Utc::now())?;
    state.db.set_entry(&auth.user_id, &meditation).await?;

    tracing::info!(
        user_id = %auth.user_id,
        meditation_id = %meditation.id,
        duration = meditation.duration_minutes,
        "Meditation logged"
    );
    Ok((StatusCode::CREATED, Json(meditation.into())))
}

async fn get_meditation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MeditationResponse>> {
    let meditation: Meditation = fetch_owned(&state.db, &auth, &id).await?;
    Ok(Json(meditation.into()))
}

async fn list_meditations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<MeditationResponse>>> {
    let sessions: Vec<Meditation> = list_for_user(&state.db, &auth, &user_id, &range).await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

async fn update_meditation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): ApiJson<MeditationRequest>,
) -> Result<Json<MeditationResponse>> {
    let date = req.check()?;
    let mut meditation: Meditation = fetch_owned(&state.db, &auth, &id).await?;
    req.apply(&mut meditation, date, chrono::Utc::now());
    state.db.set_entry(&auth.user_id, &meditation).await?;
    Ok(Json(meditation.into()))
}

async fn delete_meditation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let _: Meditation = fetch_owned(&state.db, &auth, &id).await?;
    state.db.delete_entry::<Meditation>(&auth.user_id, &id).await?;
    Ok(Json(DeletedResponse { id, deleted: true }))
}

async fn day_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<MeditationSummary>> {
    auth.ensure_owner(&user_id)?;
    let day = path_day(&date)?;
    let sessions: Vec<Meditation> = day_entries(&state.db, &user_id, day).await?;
    Ok(Json(MeditationSummary::from_sessions(day_key(day), &sessions)))
}

async fn week_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<MeditationSummary>> {
    auth.ensure_owner(&user_id)?;
    let day = path_day(&date)?;
    let (monday, sessions) = week_entries::<Meditation>(&state.db, &user_id, day).await?;
    Ok(Json(MeditationSummary::from_sessions(day_key(monday), &sessions)))
}

/// Premium-only report over all sessions, or those in `start..end`.
async fn insights(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<MeditationInsights>> {
    auth.ensure_owner(&user_id)?;
    range.bounds()?;

    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    if !user.is_premium(chrono::Utc::now()) {
        return Err(AppError::PremiumRequired);
    }

    let sessions: Vec<Meditation> = list_for_user(&state.db, &auth, &user_id, &range).await?;
    Ok(Json(MeditationInsights::from_sessions(&sessions)))
}
