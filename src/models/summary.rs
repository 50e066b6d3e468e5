//! Summaries and reporting aggregates over fetched entries.
//!
//! These are computed on read from the entries of a day or week; nothing is
//! materialized in Firestore.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Meditation, Water, Workout};

/// Sum of workout minutes for a day or week.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    /// First day of the summarized window (`YYYY-MM-DD`)
    pub date: String,
    pub total_workout_minutes: u32,
    pub sessions: u32,
}

impl WorkoutSummary {
    pub fn from_workouts(date: String, workouts: &[Workout]) -> Self {
        Self {
            date,
            total_workout_minutes: workouts.iter().map(|w| w.duration_minutes).sum(),
            sessions: workouts.len() as u32,
        }
    }
}

/// Sum of water intake for a day or week.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WaterSummary {
    pub date: String,
    pub total_water_oz: u32,
    pub entries: u32,
}

impl WaterSummary {
    pub fn from_entries(date: String, entries: &[Water]) -> Self {
        Self {
            date,
            total_water_oz: entries.iter().map(|w| w.water_consumed_oz).sum(),
            entries: entries.len() as u32,
        }
    }
}

/// Sum of meditation minutes for a day or week.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MeditationSummary {
    pub date: String,
    pub total_meditation_minutes: u32,
    pub sessions: u32,
}

impl MeditationSummary {
    pub fn from_sessions(date: String, sessions: &[Meditation]) -> Self {
        Self {
            date,
            total_meditation_minutes: sessions.iter().map(|m| m.duration_minutes).sum(),
            sessions: sessions.len() as u32,
        }
    }
}

/// Coarse part of the day a session started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Bucket by the UTC hour. Entry dates are stored in UTC with no
    /// user time zone, so a local 07:00 in Tokyo counts as `Night`.
    pub fn from_datetime(date: DateTime<Utc>) -> Self {
        match date.hour() {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

/// Premium meditation report over a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MeditationInsights {
    pub total_sessions: u32,
    pub total_minutes: u32,
    pub average_duration_minutes: f64,
    pub favorite_soundscape: Option<String>,
    pub favorite_time_of_day: Option<TimeOfDay>,
    /// Mean of (moodAfter - moodBefore) over sessions that recorded both
    pub average_mood_change: Option<f64>,
    pub deep_state_sessions: u32,
}

impl MeditationInsights {
    pub fn from_sessions(sessions: &[Meditation]) -> Self {
        if sessions.is_empty() {
            return Self::default();
        }

        let total_sessions = sessions.len() as u32;
        let total_minutes: u32 = sessions.iter().map(|m| m.duration_minutes).sum();

        let favorite_soundscape =
            most_frequent(sessions.iter().filter_map(|m| m.soundscape.clone()));
        let favorite_time_of_day =
            most_frequent(sessions.iter().map(|m| TimeOfDay::from_datetime(m.date)));

        let mood_deltas: Vec<f64> = sessions
            .iter()
            .filter_map(|m| match (m.mood_before, m.mood_after) {
                (Some(before), Some(after)) => Some(after as f64 - before as f64),
                _ => None,
            })
            .collect();
        let average_mood_change = if mood_deltas.is_empty() {
            None
        } else {
            Some(round_tenths(
                mood_deltas.iter().sum::<f64>() / mood_deltas.len() as f64,
            ))
        };

        Self {
            total_sessions,
            total_minutes,
            average_duration_minutes: round_tenths(total_minutes as f64 / total_sessions as f64),
            favorite_soundscape,
            favorite_time_of_day,
            average_mood_change,
            deep_state_sessions: sessions.iter().filter(|m| m.deep_state).count() as u32,
        }
    }
}

/// Most frequent value; ties go to the value seen first.
fn most_frequent<T, I>(values: I) -> Option<T>
where
    T: Eq + std::hash::Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, (usize, usize)> = HashMap::new();
    for (index, value) in values.into_iter().enumerate() {
        let entry = counts.entry(value).or_insert((0, index));
        entry.0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then_with(|| first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn workout(minutes: u32) -> Workout {
        let now = Utc::now();
        Workout {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            title: "Workout".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            duration_minutes: minutes,
            created_at: now,
            updated_at: now,
        }
    }

    fn meditation(
        hour: u32,
        minutes: u32,
        soundscape: Option<&str>,
        moods: Option<(u8, u8)>,
        deep_state: bool,
    ) -> Meditation {
        let now = Utc::now();
        Meditation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            duration_minutes: minutes,
            meditation_type: None,
            soundscape: soundscape.map(String::from),
            mood_before: moods.map(|m| m.0),
            mood_after: moods.map(|m| m.1),
            notes: None,
            deep_state,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_workout_summary_sums_minutes() {
        let workouts = vec![workout(10), workout(20), workout(30)];
        let summary = WorkoutSummary::from_workouts("2024-05-01".to_string(), &workouts);

        assert_eq!(summary.total_workout_minutes, 60);
        assert_eq!(summary.sessions, 3);
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let summary = WorkoutSummary::from_workouts("2024-05-01".to_string(), &[]);
        assert_eq!(summary.total_workout_minutes, 0);
        assert_eq!(summary.sessions, 0);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalWorkoutMinutes"], 0);
    }

    #[test]
    fn test_insights_favorites_and_mood() {
        let sessions = vec![
            meditation(7, 10, Some("rain"), Some((3, 6)), false),
            meditation(8, 20, Some("forest"), Some((5, 6)), true),
            meditation(21, 15, Some("rain"), None, false),
        ];

        let insights = MeditationInsights::from_sessions(&sessions);

        assert_eq!(insights.total_sessions, 3);
        assert_eq!(insights.total_minutes, 45);
        assert_eq!(insights.average_duration_minutes, 15.0);
        assert_eq!(insights.favorite_soundscape.as_deref(), Some("rain"));
        assert_eq!(insights.favorite_time_of_day, Some(TimeOfDay::Morning));
        assert_eq!(insights.average_mood_change, Some(2.0));
        assert_eq!(insights.deep_state_sessions, 1);
    }

    #[test]
    fn test_insights_empty() {
        let insights = MeditationInsights::from_sessions(&[]);
        assert_eq!(insights, MeditationInsights::default());
    }

    #[test]
    fn test_most_frequent_tie_prefers_first_seen() {
        let values = vec!["ocean", "rain", "rain", "ocean"];
        assert_eq!(most_frequent(values), Some("ocean"));
    }

    #[test]
    fn test_time_of_day_buckets() {
        let at = |h| Utc.with_ymd_and_hms(2024, 5, 1, h, 0, 0).unwrap();
        assert_eq!(TimeOfDay::from_datetime(at(4)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_datetime(at(5)), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_datetime(at(12)), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_datetime(at(20)), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_datetime(at(23)), TimeOfDay::Night);
    }

    #[test]
    fn test_time_of_day_uses_utc_hour() {
        let tokyo_morning = DateTime::parse_from_rfc3339("2024-05-01T07:00:00+09:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(TimeOfDay::from_datetime(tokyo_morning), TimeOfDay::Night);
    }
}
