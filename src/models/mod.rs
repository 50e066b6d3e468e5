// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod meditation;
pub mod note;
pub mod summary;
pub mod user;
pub mod water;
pub mod workout;

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::time_utils::parse_entry_date;

pub use meditation::{Meditation, MeditationRequest, MeditationResponse};
pub use note::{Note, NoteRequest, NoteResponse};
pub use summary::{MeditationInsights, MeditationSummary, WaterSummary, WorkoutSummary};
pub use user::{
    PublicUser, SessionUser, SignupRequest, SubscriptionStatus, SubscriptionView,
    UpdateUserRequest, User, UserGoals,
};
pub use water::{Water, WaterRequest, WaterResponse};
pub use workout::{Workout, WorkoutRequest, WorkoutResponse};

/// Parse the `date` field of an entry request body.
pub(crate) fn parse_request_date(raw: &str) -> Result<DateTime<Utc>> {
    parse_entry_date(raw).ok_or_else(|| {
        AppError::BadRequest("Invalid 'date': expected YYYY-MM-DD or RFC3339".to_string())
    })
}
