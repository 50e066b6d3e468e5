//! Diary notes (`users/{uid}/notes/{id}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::{collections, Entry};
use crate::error::Result;
use crate::time_utils::format_utc_rfc3339;

/// Stored note document. Notes are dated by creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entry for Note {
    const COLLECTION: &'static str = collections::NOTES;
    const LABEL: &'static str = "Note";
    const DATE_FIELD: &'static str = "createdAt";

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "Note text is required"))]
    pub text: String,
    #[validate(length(max = 50))]
    pub mood: Option<String>,
}

impl NoteRequest {
    pub fn into_note(self, user_id: &str, now: DateTime<Utc>) -> Result<Note> {
        self.validate()?;
        Ok(Note {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: self.title,
            text: self.text,
            mood: self.mood,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrite the editable fields; the caller validates first.
    pub fn apply(self, note: &mut Note, now: DateTime<Utc>) {
        note.title = self.title;
        note.text = self.text;
        note.mood = self.mood;
        note.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub text: String,
    pub mood: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Note> for NoteResponse {
    fn from(n: Note) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            title: n.title,
            text: n.text,
            mood: n.mood,
            created_at: format_utc_rfc3339(n.created_at),
            updated_at: format_utc_rfc3339(n.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_rejected() {
        let req = NoteRequest {
            title: "Today".to_string(),
            text: String::new(),
            mood: None,
        };
        assert!(req.into_note("u1", Utc::now()).is_err());
    }

    #[test]
    fn test_update_bumps_updated_at_only() {
        let created = Utc::now();
        let mut note = NoteRequest {
            title: "Today".to_string(),
            text: "Felt calm".to_string(),
            mood: Some("calm".to_string()),
        }
        .into_note("u1", created)
        .unwrap();

        let later = created + chrono::Duration::minutes(5);
        NoteRequest {
            title: "Today".to_string(),
            text: "Felt calm, then tired".to_string(),
            mood: None,
        }
        .apply(&mut note, later);

        assert_eq!(note.created_at, created);
        assert_eq!(note.updated_at, later);
        assert!(note.mood.is_none());
    }
}
