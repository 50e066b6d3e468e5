// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User account routes (`/api/users`).

use crate::error::{ApiJson, AppError, Result};
use crate::middleware::auth::{create_jwt, removal_cookie, session_cookie, AuthUser};
use crate::models::{PublicUser, SessionUser, SignupRequest, UpdateUserRequest, User};
use crate::services::password;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::{cookie::CookieJar, WithRejection};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Sign-up is public.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/new", post(signup))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/users/{id}",
        get(get_user).put(update_user).delete(delete_user),
    )
}

/// Response for sign-up and login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub token: String,
}

/// Issue a session for `user`: JWT in the body and in the cookie.
pub(crate) fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, SessionResponse)> {
    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;
    let jar = jar.add(session_cookie(token.clone(), &state.config.frontend_url));
    Ok((
        jar,
        SessionResponse {
            user: user.to_session(chrono::Utc::now()),
            token,
        },
    ))
}

/// Create an account on a 14-day premium trial and log it in.
async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Json(req), _): ApiJson<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let req = req.normalized();
    req.validate()?;

    let username = req.username;
    let email = req.email;

    let (by_username, by_email) = tokio::try_join!(
        state.db.find_user_by_username(&username),
        state.db.find_user_by_email(&email),
    )?;
    if by_username.is_some() {
        return Err(AppError::Conflict("Username is already taken".to_string()));
    }
    if by_email.is_some() {
        return Err(AppError::Conflict("Email is already registered".to_string()));
    }

    let plain = req.password;
    let hashed_password = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))??;

    let user = User::new_with_trial(
        username,
        email,
        hashed_password,
        req.first_name,
        req.last_name,
        req.goals,
        chrono::Utc::now(),
    );
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User signed up");

    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, Json(body)))
}

/// Public profile of any user.
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>> {
    let user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
    Ok(Json(user.to_public()))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): ApiJson<UpdateUserRequest>,
) -> Result<Json<SessionUser>> {
    auth.ensure_owner(&id)?;
    let req = req.normalized();
    req.validate()?;

    let now = chrono::Utc::now();
    let user = state
        .db
        .update_user_atomic(&id, |user| {
            req.clone().apply(user, now);
            Ok(user.clone())
        })
        .await?;

    Ok(Json(user.to_session(now)))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub id: String,
    pub deleted: bool,
    pub documents_deleted: usize,
}

/// Delete the account, every entry it owns, and the session cookie.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<(CookieJar, Json<DeleteAccountResponse>)> {
    auth.ensure_owner(&id)?;

    if state.db.get_user(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("User {} not found", id)));
    }

    tracing::info!(user_id = %id, "User-initiated account deletion");
    let documents_deleted = state.db.delete_user_data(&id).await?;

    let jar = jar.add(removal_cookie(&state.config.frontend_url));
    Ok((
        jar,
        Json(DeleteAccountResponse {
            id,
            deleted: true,
            documents_deleted,
        }),
    ))
}
