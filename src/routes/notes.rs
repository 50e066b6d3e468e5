// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Diary note routes (`/api/notes`). Notes have no summaries.

use crate::error::{ApiJson, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Note, NoteRequest, NoteResponse};
use crate::routes::entries::{fetch_owned, list_for_user, DeletedResponse, RangeQuery};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::WithRejection;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notes/new", post(create_note))
        .route(
            "/api/notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/notes/user/{user_id}", get(list_notes))
}

async fn create_note(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    WithRejection(Json(req), _): ApiJson<NoteRequest>,
) -> Result<(StatusCode, Json<NoteResponse>)> {
    let note = req.into_note(&auth.user_id, chrono::Utc::now())?;
    state.db.set_entry(&auth.user_id, &note).await?;
    Ok((StatusCode::CREATED, Json(note.into())))
}

async fn get_note(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<NoteResponse>> {
    let note: Note = fetch_owned(&state.db, &auth, &id).await?;
    Ok(Json(note.into()))
}

async fn list_notes(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<NoteResponse>>> {
    let notes: Vec<Note> = list_for_user(&state.db, &auth, &user_id, &range).await?;
    Ok(Json(notes.into_iter().map(Into::into).collect()))
}

async fn update_note(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(req), _): ApiJson<NoteRequest>,
) -> Result<Json<NoteResponse>> {
    req.validate()?;
    let mut note: Note = fetch_owned(&state.db, &auth, &id).await?;
    req.apply(&mut note, chrono::Utc::now());
    state.db.set_entry(&auth.user_id, &note).await?;
    Ok(Json(note.into()))
}

async fn delete_note(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let _: Note = fetch_owned(&state.db, &auth, &id).await?;
    state.db.delete_entry::<Note>(&auth.user_id, &id).await?;
    Ok(Json(DeletedResponse { id, deleted: true }))
}
