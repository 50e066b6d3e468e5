//! Meditation sessions (`users/{uid}/meditations/{id}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::parse_request_date;
use crate::db::{collections, Entry};
use crate::error::Result;
use crate::time_utils::format_utc_rfc3339;

/// Stored meditation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meditation {
    pub id: String,
    pub user_id: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
    pub duration_minutes: u32,
    /// Technique, e.g. "breathing", "body-scan"
    #[serde(default)]
    pub meditation_type: Option<String>,
    #[serde(default)]
    pub soundscape: Option<String>,
    /// Self-reported mood on a 1-10 scale
    #[serde(default)]
    pub mood_before: Option<u8>,
    #[serde(default)]
    pub mood_after: Option<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub deep_state: bool,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entry for Meditation {
    const COLLECTION: &'static str = collections::MEDITATIONS;
    const LABEL: &'static str = "Meditation";

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MeditationRequest {
    pub date: String,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: i64,
    #[validate(length(max = 50))]
    pub meditation_type: Option<String>,
    #[validate(length(max = 50))]
    pub soundscape: Option<String>,
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood_before: Option<u8>,
    #[validate(range(min = 1, max = 10, message = "Mood must be between 1 and 10"))]
    pub mood_after: Option<u8>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub deep_state: bool,
}

impl MeditationRequest {
    /// Validate the body and parse its date.
    pub fn check(&self) -> Result<DateTime<Utc>> {
        self.validate()?;
        parse_request_date(&self.date)
    }

    pub fn into_meditation(self, user_id: &str, now: DateTime<Utc>) -> Result<Meditation> {
        let date = self.check()?;
        Ok(Meditation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date,
            duration_minutes: self.duration_minutes as u32,
            meditation_type: self.meditation_type,
            soundscape: self.soundscape,
            mood_before: self.mood_before,
            mood_after: self.mood_after,
            notes: self.notes,
            deep_state: self.deep_state,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(self, meditation: &mut Meditation, date: DateTime<Utc>, now: DateTime<Utc>) {
        meditation.date = date;
        meditation.duration_minutes = self.duration_minutes as u32;
        meditation.meditation_type = self.meditation_type;
        meditation.soundscape = self.soundscape;
        meditation.mood_before = self.mood_before;
        meditation.mood_after = self.mood_after;
        meditation.notes = self.notes;
        meditation.deep_state = self.deep_state;
        meditation.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MeditationResponse {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub duration_minutes: u32,
    pub meditation_type: Option<String>,
    pub soundscape: Option<String>,
    pub mood_before: Option<u8>,
    pub mood_after: Option<u8>,
    pub notes: Option<String>,
    pub deep_state: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Meditation> for MeditationResponse {
    fn from(m: Meditation) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            date: format_utc_rfc3339(m.date),
            duration_minutes: m.duration_minutes,
            meditation_type: m.meditation_type,
            soundscape: m.soundscape,
            mood_before: m.mood_before,
            mood_after: m.mood_after,
            notes: m.notes,
            deep_state: m.deep_state,
            created_at: format_utc_rfc3339(m.created_at),
            updated_at: format_utc_rfc3339(m.updated_at),
        }
    }
}
