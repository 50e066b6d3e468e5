// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout routes (`/api/workouts`).

use crate::error::{ApiJson, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Workout, WorkoutRequest, WorkoutResponse, WorkoutSummary};
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
        .route("/api/workouts/new", post(create_workout))
        .route(
            "/api/workouts/{id}",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route("/api/workouts/user/{user_id}", get(list_workouts))
        .route(
            "/api/workouts/user/{user_id}/date/{date}/summary",
            get(day_summary),
        )
        .route(
            "/api/workouts/user/{user_id}/week/{date}/summary",
            get(week_summary),
        )
}

async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(req), _): ApiJson<WorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutResponse>)> {
    let workout = req.into_workout(&auth.user_id, chrono::Utc::now())?;
    state.db.set_entry(&auth.user_id, &workout).await?;

    tracing::info!(user_id = %auth.user_id, workout_id = %workout.id, "Workout created");
    Ok((StatusCode::CREATED, Json(workout.into())))
}

async fn get_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WorkoutResponse>> {
    let workout: Workout = fetch_owned(&state.db, &auth, &id).await?;
    Ok(Json(workout.into()))
}

async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<WorkoutResponse>>> {
    let workouts: Vec<Workout> = list_for_user(&state.db, &auth, &user_id, &range).await?;
    Ok(Json(workouts.into_iter().map(Into::into).collect()))
}

async fn update_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): ApiJson<WorkoutRequest>,
) -> Result<Json<WorkoutResponse>> {
    let date = req.check()?;
    let mut workout: Workout = fetch_owned(&state.db, &auth, &id).await?;
    req.apply(&mut workout, date, chrono::Utc::now());
    state.db.set_entry(&auth.user_id, &workout).await?;
    Ok(Json(workout.into()))
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let _: Workout = fetch_owned(&state.db, &auth, &id).await?;
    state.db.delete_entry::<Workout>(&auth.user_id, &id).await?;

    tracing::info!(user_id = %auth.user_id, workout_id = %id, "Workout deleted");
    Ok(Json(DeletedResponse { id, deleted: true }))
}

/// Total workout minutes on one day.
async fn day_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<WorkoutSummary>> {
    auth.ensure_owner(&user_id)?;
    let day = path_day(&date)?;
    let workouts: Vec<Workout> = day_entries(&state.db, &user_id, day).await?;
    Ok(Json(WorkoutSummary::from_workouts(day_key(day), &workouts)))
}

/// Total workout minutes in the Monday-start week containing the date.
async fn week_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<WorkoutSummary>> {
    auth.ensure_owner(&user_id)?;
    let day = path_day(&date)?;
    let (monday, workouts) = week_entries::<Workout>(&state.db, &user_id, day).await?;
    Ok(Json(WorkoutSummary::from_workouts(day_key(monday), &workouts)))
}
