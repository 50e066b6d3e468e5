// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gamified challenges: a static catalog of goal conditions that can each be
//! claimed once per period for points.
//!
//! Eligibility is pure arithmetic over an [`ActivitySnapshot`] built from the
//! user's entries for the day and week. Claims are recorded on the user
//! document as `challenge id -> period key`, so a new day or ISO week makes a
//! challenge claimable again.

use chrono::NaiveDate;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Meditation, Note, User, Water, Workout};
use crate::services::goals::goal_met;
use crate::time_utils::{day_bounds, day_key, week_bounds, week_key};

/// How often a challenge resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ChallengePeriod {
    Day,
    Week,
}

impl ChallengePeriod {
    /// Key identifying the period containing `day`.
    pub fn key(self, day: NaiveDate) -> String {
        match self {
            ChallengePeriod::Day => day_key(day),
            ChallengePeriod::Week => week_key(day),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    WeeklyMeditationSessions(u32),
    WeeklyWorkoutMinutes(u32),
    DailyWaterGoal,
    DailyMeditationGoal,
    DailyNotes(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub period: ChallengePeriod,
    pub points: u32,
    requirement: Requirement,
}

pub const CATALOG: &[Challenge] = &[
    Challenge {
        id: "meditation-3-week",
        title: "Mindful Week",
        description: "Meditate 3 times this week",
        period: ChallengePeriod::Week,
        points: 50,
        requirement: Requirement::WeeklyMeditationSessions(3),
    },
    Challenge {
        id: "workout-150-week",
        title: "Active Week",
        description: "Work out for 150 minutes this week",
        period: ChallengePeriod::Week,
        points: 75,
        requirement: Requirement::WeeklyWorkoutMinutes(150),
    },
    Challenge {
        id: "water-goal-today",
        title: "Hydrated",
        description: "Reach your water goal today",
        period: ChallengePeriod::Day,
        points: 10,
        requirement: Requirement::DailyWaterGoal,
    },
    Challenge {
        id: "meditation-goal-today",
        title: "Daily Calm",
        description: "Reach your meditation goal today",
        period: ChallengePeriod::Day,
        points: 10,
        requirement: Requirement::DailyMeditationGoal,
    },
    Challenge {
        id: "daily-note",
        title: "Dear Diary",
        description: "Write a note today",
        period: ChallengePeriod::Day,
        points: 5,
        requirement: Requirement::DailyNotes(1),
    },
];

/// Look up a challenge by id.
pub fn find(id: &str) -> Option<&'static Challenge> {
    CATALOG.iter().find(|c| c.id == id)
}

/// Activity totals a challenge can be judged against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySnapshot {
    pub water_today_oz: u32,
    pub meditation_today_minutes: u32,
    pub notes_today: u32,
    pub meditation_week_sessions: u32,
    pub workout_week_minutes: u32,
    pub water_goal_oz: Option<u32>,
    pub meditation_goal_minutes: Option<u32>,
}

impl ActivitySnapshot {
    /// Fetch the user's day and week entries around `day`.
    pub async fn load(db: &FirestoreDb, user: &User, day: NaiveDate) -> Result<Self> {
        let out_of_range = || AppError::BadRequest(format!("Date {} is out of range", day));
        let (day_start, day_end) = day_bounds(day).ok_or_else(out_of_range)?;
        let (week_start, week_end) = week_bounds(day).ok_or_else(out_of_range)?;
        let uid = user.id.as_str();

        let (water_today, meditations_today, notes_today, meditations_week, workouts_week) = tokio::try_join!(
            db.list_entries_between::<Water>(uid, day_start, day_end),
            db.list_entries_between::<Meditation>(uid, day_start, day_end),
            db.list_entries_between::<Note>(uid, day_start, day_end),
            db.list_entries_between::<Meditation>(uid, week_start, week_end),
            db.list_entries_between::<Workout>(uid, week_start, week_end),
        )?;

        Ok(Self {
            water_today_oz: water_today.iter().map(|w| w.water_consumed_oz).sum(),
            meditation_today_minutes: meditations_today.iter().map(|m| m.duration_minutes).sum(),
            notes_today: notes_today.len() as u32,
            meditation_week_sessions: meditations_week.len() as u32,
            workout_week_minutes: workouts_week.iter().map(|w| w.duration_minutes).sum(),
            water_goal_oz: user.water_goal_oz,
            meditation_goal_minutes: user.meditation_goal_minutes,
        })
    }
}

impl Challenge {
    pub fn is_completed(&self, snapshot: &ActivitySnapshot) -> bool {
        match self.requirement {
            Requirement::WeeklyMeditationSessions(n) => snapshot.meditation_week_sessions >= n,
            Requirement::WeeklyWorkoutMinutes(n) => snapshot.workout_week_minutes >= n,
            Requirement::DailyWaterGoal => {
                goal_met(snapshot.water_today_oz, snapshot.water_goal_oz)
            }
            Requirement::DailyMeditationGoal => goal_met(
                snapshot.meditation_today_minutes,
                snapshot.meditation_goal_minutes,
            ),
            Requirement::DailyNotes(n) => snapshot.notes_today >= n,
        }
    }

    /// Whether `user` already claimed this challenge in the period of `day`.
    pub fn is_claimed(&self, user: &User, day: NaiveDate) -> bool {
        user.challenges
            .get(self.id)
            .is_some_and(|key| *key == self.period.key(day))
    }
}

/// Challenge state as seen by the client.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStatus {
    pub id: String,
    pub title: String,
    pub description: String,
    pub period: ChallengePeriod,
    pub points: u32,
    pub completed: bool,
    pub claimed: bool,
}

/// Status of every catalog challenge for `user` on `day`.
pub fn statuses(user: &User, snapshot: &ActivitySnapshot, day: NaiveDate) -> Vec<ChallengeStatus> {
    CATALOG
        .iter()
        .map(|c| ChallengeStatus {
            id: c.id.to_string(),
            title: c.title.to_string(),
            description: c.description.to_string(),
            period: c.period,
            points: c.points,
            completed: c.is_completed(snapshot),
            claimed: c.is_claimed(user, day),
        })
        .collect()
}

/// Award the challenge's points to `user` and record the claim.
///
/// Returns the new point balance.
pub fn claim(
    user: &mut User,
    challenge: &Challenge,
    snapshot: &ActivitySnapshot,
    day: NaiveDate,
) -> Result<u32> {
    if challenge.is_claimed(user, day) {
        return Err(AppError::Conflict(format!(
            "Challenge '{}' already claimed for this {}",
            challenge.id,
            match challenge.period {
                ChallengePeriod::Day => "day",
                ChallengePeriod::Week => "week",
            }
        )));
    }
    if !challenge.is_completed(snapshot) {
        return Err(AppError::BadRequest(format!(
            "Challenge '{}' is not completed yet",
            challenge.id
        )));
    }

    user.points = user.points.saturating_add(challenge.points);
    user.challenges
        .insert(challenge.id.to_string(), challenge.period.key(day));
    Ok(user.points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserGoals;
    use chrono::Utc;

    fn user() -> User {
        User::new_with_trial(
            "calmcat".to_string(),
            "cat@example.com".to_string(),
            "hash".to_string(),
            "Calm".to_string(),
            "Cat".to_string(),
            UserGoals {
                exercise_goal_minutes: Some(30),
                water_goal_oz: Some(64),
                meditation_goal_minutes: Some(10),
            },
            Utc::now(),
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            assert!(CATALOG[i + 1..].iter().all(|b| b.id != a.id));
        }
        assert!(find("meditation-3-week").is_some());
        assert!(find("unknown").is_none());
    }

    #[test]
    fn test_meditation_week_threshold() {
        let challenge = find("meditation-3-week").unwrap();
        let mut snapshot = ActivitySnapshot {
            meditation_week_sessions: 2,
            ..Default::default()
        };
        assert!(!challenge.is_completed(&snapshot));
        snapshot.meditation_week_sessions = 3;
        assert!(challenge.is_completed(&snapshot));
    }

    #[test]
    fn test_goal_challenge_requires_goal() {
        let challenge = find("water-goal-today").unwrap();
        let snapshot = ActivitySnapshot {
            water_today_oz: 200,
            water_goal_oz: None,
            ..Default::default()
        };
        assert!(!challenge.is_completed(&snapshot));
    }

    #[test]
    fn test_claim_once_per_day() {
        let mut user = user();
        let challenge = find("daily-note").unwrap();
        let snapshot = ActivitySnapshot {
            notes_today: 1,
            ..Default::default()
        };

        assert_eq!(claim(&mut user, challenge, &snapshot, day(5)).unwrap(), 5);
        let err = claim(&mut user, challenge, &snapshot, day(5)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(user.points, 5);

        // Next day resets the claim
        assert_eq!(claim(&mut user, challenge, &snapshot, day(6)).unwrap(), 10);
    }

    #[test]
    fn test_weekly_claim_spans_the_week() {
        let mut user = user();
        let challenge = find("workout-150-week").unwrap();
        let snapshot = ActivitySnapshot {
            workout_week_minutes: 150,
            ..Default::default()
        };

        // 2024-03-04 is a Monday; 03-10 is the Sunday of the same week
        claim(&mut user, challenge, &snapshot, day(4)).unwrap();
        assert!(challenge.is_claimed(&user, day(10)));
        assert!(!challenge.is_claimed(&user, day(11)));
        assert_eq!(user.challenges["workout-150-week"], "2024-W10");
    }

    #[test]
    fn test_incomplete_claim_rejected() {
        let mut user = user();
        let challenge = find("meditation-goal-today").unwrap();
        let snapshot = ActivitySnapshot {
            meditation_today_minutes: 5,
            meditation_goal_minutes: Some(10),
            ..Default::default()
        };

        let err = claim(&mut user, challenge, &snapshot, day(5)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(user.points, 0);
        assert!(user.challenges.is_empty());
    }

    #[test]
    fn test_statuses_cover_catalog() {
        let user = user();
        let snapshot = ActivitySnapshot {
            notes_today: 2,
            ..Default::default()
        };
        let statuses = statuses(&user, &snapshot, day(5));

        assert_eq!(statuses.len(), CATALOG.len());
        let note = statuses.iter().find(|s| s.id == "daily-note").unwrap();
        assert!(note.completed);
        assert!(!note.claimed);
    }
}
