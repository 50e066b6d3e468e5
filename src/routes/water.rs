// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Water intake routes (`/api/waterintake`).

use crate::error::{ApiJson, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Water, WaterRequest, WaterResponse, WaterSummary};
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
        .route("/api/waterintake/new", post(create_water))
        .route(
            "/api/waterintake/{id}",
            get(get_water).put(update_water).delete(delete_water),
        )
        .route("/api/waterintake/user/{user_id}", get(list_water))
        .route(
            "/api/waterintake/user/{user_id}/date/{date}/summary",
            get(day_summary),
        )
        .route(
            "/api/waterintake/user/{user_id}/week/{date}/summary",
            get(week_summary),
        )
}

async fn create_water(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(req), _): ApiJson<WaterRequest>,
) -> Result<(StatusCode, Json<WaterResponse>)> {
    let water = req.into_water(&auth.user_id, chrono::Utc::now())?;
    state.db.set_entry(&auth.user_id, &water).await?;
    Ok((StatusCode::CREATED, Json(water.into())))
}

async fn get_water(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<WaterResponse>> {
    let water: Water = fetch_owned(&state.db, &auth, &id).await?;
    Ok(Json(water.into()))
}

async fn list_water(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<WaterResponse>>> {
    let entries: Vec<Water> = list_for_user(&state.db, &auth, &user_id, &range).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

async fn update_water(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): ApiJson<WaterRequest>,
) -> Result<Json<WaterResponse>> {
    let date = req.check()?;
    let mut water: Water = fetch_owned(&state.db, &auth, &id).await?;
    req.apply(&mut water, date, chrono::Utc::now());
    state.db.set_entry(&auth.user_id, &water).await?;
    Ok(Json(water.into()))
}

async fn delete_water(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let _: Water = fetch_owned(&state.db, &auth, &id).await?;
    state.db.delete_entry::<Water>(&auth.user_id, &id).await?;
    Ok(Json(DeletedResponse { id, deleted: true }))
}

async fn day_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<WaterSummary>> {
    auth.ensure_owner(&user_id)?;
    let day = path_day(&date)?;
    let entries: Vec<Water> = day_entries(&state.db, &user_id, day).await?;
    Ok(Json(WaterSummary::from_entries(day_key(day), &entries)))
}

async fn week_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, date)): Path<(String, String)>,
) -> Result<Json<WaterSummary>> {
    auth.ensure_owner(&user_id)?;
    let day = path_day(&date)?;
    let (monday, entries) = week_entries::<Water>(&state.db, &user_id, day).await?;
    Ok(Json(WaterSummary::from_entries(day_key(monday), &entries)))
}
