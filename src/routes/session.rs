// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login, current session and logout (`/api/session`).

use crate::error::{ApiJson, AppError, Result};
use crate::middleware::auth::{removal_cookie, AuthUser};
use crate::models::{SessionUser, User};
use crate::routes::users::{start_session, SessionResponse};
use crate::services::password;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Login and logout need no session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/session", post(login).delete(logout))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/session", get(current_session))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub credential: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

async fn find_by_credential(state: &AppState, credential: &str) -> Result<Option<User>> {
    let credential = credential.trim();
    // Usernames cannot contain '@'
    if credential.contains('@') {
        state.db.find_user_by_email(&credential.to_lowercase()).await
    } else {
        state.db.find_user_by_username(credential).await
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(req), _): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    req.validate()?;

    let Some(user) = find_by_credential(&state, &req.credential).await? else {
        tracing::debug!("Login failed: unknown credential");
        return Err(AppError::Unauthorized);
    };

    let hash = user.hashed_password.clone();
    let plain = req.password;
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {}", e)))?;
    if !valid {
        tracing::debug!(user_id = %user.id, "Login failed: wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(user_id = %user.id, "User logged in");
    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((jar, Json(body)))
}

async fn current_session(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SessionUser>> {
    let user = state
        .db
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
    Ok(Json(user.to_session(chrono::Utc::now())))
}

async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    (
        StatusCode::NO_CONTENT,
        jar.add(removal_cookie(&state.config.frontend_url)),
    )
}
