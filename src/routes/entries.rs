// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Helpers shared by the entry resources (workouts, water, meditations, notes).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{Entry, FirestoreDb};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::time_utils::{day_bounds, parse_day, parse_entry_date, week_bounds};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Optional `start`/`end` filter on list endpoints.
///
/// `start` is inclusive. A date-only `end` includes that whole day; an
/// RFC3339 `end` is exclusive.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    pub fn bounds(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let start = self
            .start
            .as_deref()
            .map(|raw| {
                parse_entry_date(raw)
                    .ok_or_else(|| AppError::BadRequest(format!("Invalid 'start' date: {}", raw)))
            })
            .transpose()?;

        let end = self
            .end
            .as_deref()
            .map(|raw| {
                let raw = raw.trim();
                if raw.len() == 10 {
                    parse_day(raw).and_then(day_bounds).map(|(_, end)| end)
                } else {
                    parse_entry_date(raw)
                }
                .ok_or_else(|| AppError::BadRequest(format!("Invalid 'end' date: {}", raw)))
            })
            .transpose()?;

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                return Err(AppError::BadRequest(
                    "'start' must be before 'end'".to_string(),
                ));
            }
        }
        Ok((start, end))
    }
}

/// Body returned by DELETE endpoints.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

/// Parse a `{date}` path segment.
pub fn path_day(raw: &str) -> Result<NaiveDate> {
    parse_day(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid date '{}': expected YYYY-MM-DD or RFC3339",
            raw
        ))
    })
}

/// Load an entry of the authenticated user or fail with 404.
pub async fn fetch_owned<E: Entry>(db: &FirestoreDb, auth: &AuthUser, id: &str) -> Result<E> {
    db.get_entry::<E>(&auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {} not found", E::LABEL, id)))
}

/// List a user's entries, newest first, optionally restricted to a range.
pub async fn list_for_user<E: Entry>(
    db: &FirestoreDb,
    auth: &AuthUser,
    user_id: &str,
    range: &RangeQuery,
) -> Result<Vec<E>> {
    auth.ensure_owner(user_id)?;
    let (start, end) = range.bounds()?;

    let mut entries = match (start, end) {
        (Some(start), Some(end)) => {
            let mut entries = db.list_entries_between::<E>(user_id, start, end).await?;
            entries.reverse();
            entries
        }
        _ => db.list_entries::<E>(user_id).await?,
    };

    entries.retain(|e| {
        start.map_or(true, |s| e.date() >= s) && end.map_or(true, |en| e.date() < en)
    });
    Ok(entries)
}

fn out_of_range(day: NaiveDate) -> AppError {
    AppError::BadRequest(format!("Date {} is out of range", day))
}

/// Entries of `user_id` dated on `day`.
pub async fn day_entries<E: Entry>(db: &FirestoreDb, user_id: &str, day: NaiveDate) -> Result<Vec<E>> {
    let (start, end) = day_bounds(day).ok_or_else(|| out_of_range(day))?;
    db.list_entries_between::<E>(user_id, start, end).await
}

/// Entries of `user_id` in the Monday-start week containing `day`.
/// Also returns that Monday.
pub async fn week_entries<E: Entry>(
    db: &FirestoreDb,
    user_id: &str,
    day: NaiveDate,
) -> Result<(NaiveDate, Vec<E>)> {
    let (start, end) = week_bounds(day).ok_or_else(|| out_of_range(day))?;
    let entries = db.list_entries_between::<E>(user_id, start, end).await?;
    Ok((start.date_naive(), entries))
}
