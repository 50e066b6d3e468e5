// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard: day and week goal progress for every activity in one call.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Meditation, SubscriptionView, Water, Workout};
use crate::routes::entries::{day_entries, path_day, week_entries};
use crate::services::goals::GoalProgress;
use crate::time_utils::day_key;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard", get(get_dashboard))
}

#[derive(Deserialize)]
struct DashboardParams {
    /// Day to report on (defaults to today, UTC)
    date: Option<String>,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub date: String,
    pub week_start: String,
    pub exercise: GoalProgress,
    pub water: GoalProgress,
    pub meditation: GoalProgress,
    pub points: u32,
    pub subscription: SubscriptionView,
}

async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<DashboardParams>,
) -> Result<Json<DashboardResponse>> {
    let now = chrono::Utc::now();
    let day = match params.date.as_deref() {
        Some(raw) => path_day(raw)?,
        None => now.date_naive(),
    };
    let db = &state.db;
    let uid = auth.user_id.as_str();

    let (user, workouts_day, workouts_week, water_day, water_week, meditation_day, meditation_week) = tokio::try_join!(
        db.get_user(uid),
        day_entries::<Workout>(db, uid, day),
        week_entries::<Workout>(db, uid, day),
        day_entries::<Water>(db, uid, day),
        week_entries::<Water>(db, uid, day),
        day_entries::<Meditation>(db, uid, day),
        week_entries::<Meditation>(db, uid, day),
    )?;
    let user = user.ok_or_else(|| AppError::NotFound(format!("User {} not found", uid)))?;

    let workout_minutes = |w: &[Workout]| w.iter().map(|w| w.duration_minutes).sum::<u32>();
    let water_oz = |w: &[Water]| w.iter().map(|w| w.water_consumed_oz).sum::<u32>();
    let meditation_minutes = |m: &[Meditation]| m.iter().map(|m| m.duration_minutes).sum::<u32>();

    let (monday, workouts_week) = workouts_week;

    Ok(Json(DashboardResponse {
        date: day_key(day),
        week_start: day_key(monday),
        exercise: GoalProgress::new(
            workout_minutes(&workouts_day),
            workout_minutes(&workouts_week),
            user.exercise_goal_minutes,
        ),
        water: GoalProgress::new(
            water_oz(&water_day),
            water_oz(&water_week.1),
            user.water_goal_oz,
        ),
        meditation: GoalProgress::new(
            meditation_minutes(&meditation_day),
            meditation_minutes(&meditation_week.1),
            user.meditation_goal_minutes,
        ),
        points: user.points,
        subscription: user.subscription_view(now),
    }))
}
