//! Workout entries (`users/{uid}/workouts/{id}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::parse_request_date;
use crate::db::{collections, Entry};
use crate::error::Result;
use crate::time_utils::format_utc_rfc3339;

/// Stored workout document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entry for Workout {
    const COLLECTION: &'static str = collections::WORKOUTS;
    const LABEL: &'static str = "Workout";

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

/// Create/update request body (the edit form submits every field).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub date: String,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: i64,
}

impl WorkoutRequest {
    /// Validate the body and parse its date.
    pub fn check(&self) -> Result<DateTime<Utc>> {
        self.validate()?;
        parse_request_date(&self.date)
    }

    /// Validate and build a new workout owned by `user_id`.
    pub fn into_workout(self, user_id: &str, now: DateTime<Utc>) -> Result<Workout> {
        let date = self.check()?;
        Ok(Workout {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: self.title,
            date,
            duration_minutes: self.duration_minutes as u32,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the editable fields of `workout`; `date` comes from [`Self::check`].
    pub fn apply(self, workout: &mut Workout, date: DateTime<Utc>, now: DateTime<Utc>) {
        workout.date = date;
        workout.title = self.title;
        workout.duration_minutes = self.duration_minutes as u32;
        workout.updated_at = now;
    }
}

/// Workout as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub date: String,
    pub duration_minutes: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Workout> for WorkoutResponse {
    fn from(w: Workout) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            title: w.title,
            date: format_utc_rfc3339(w.date),
            duration_minutes: w.duration_minutes,
            created_at: format_utc_rfc3339(w.created_at),
            updated_at: format_utc_rfc3339(w.updated_at),
        }
    }
}
