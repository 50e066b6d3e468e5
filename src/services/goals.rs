// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal progress arithmetic for the dashboard.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Days in a goal week; weekly goals are the daily goal times this.
pub const DAYS_PER_WEEK: u32 = 7;

/// Percentage of `goal` reached by `total`, rounded and capped at 100.
///
/// A missing or zero goal yields 0.
pub fn percent_of_goal(total: u32, goal: Option<u32>) -> u32 {
    match goal {
        Some(goal) if goal > 0 => {
            let percent = (total as f64 / goal as f64 * 100.0).round();
            percent.min(100.0) as u32
        }
        _ => 0,
    }
}

/// Whether a set goal has been reached. Unset goals are never met.
pub fn goal_met(total: u32, goal: Option<u32>) -> bool {
    goal.is_some_and(|goal| goal > 0 && total >= goal)
}

/// Day and week progress for one activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub day_total: u32,
    pub week_total: u32,
    pub daily_goal: Option<u32>,
    pub weekly_goal: Option<u32>,
    pub day_percent: u32,
    pub week_percent: u32,
}

impl GoalProgress {
    pub fn new(day_total: u32, week_total: u32, daily_goal: Option<u32>) -> Self {
        let weekly_goal = daily_goal.map(|goal| goal.saturating_mul(DAYS_PER_WEEK));
        Self {
            day_total,
            week_total,
            daily_goal,
            weekly_goal,
            day_percent: percent_of_goal(day_total, daily_goal),
            week_percent: percent_of_goal(week_total, weekly_goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_rounds_and_caps() {
        assert_eq!(percent_of_goal(20, Some(30)), 67);
        assert_eq!(percent_of_goal(30, Some(30)), 100);
        assert_eq!(percent_of_goal(90, Some(30)), 100);
        assert_eq!(percent_of_goal(0, Some(30)), 0);
    }

    #[test]
    fn test_percent_without_goal_is_zero() {
        assert_eq!(percent_of_goal(45, None), 0);
        assert_eq!(percent_of_goal(45, Some(0)), 0);
    }

    #[test]
    fn test_goal_met_requires_goal() {
        assert!(goal_met(64, Some(64)));
        assert!(!goal_met(63, Some(64)));
        assert!(!goal_met(100, None));
    }

    #[test]
    fn test_weekly_goal_is_seven_days() {
        let progress = GoalProgress::new(15, 105, Some(30));
        assert_eq!(progress.weekly_goal, Some(210));
        assert_eq!(progress.day_percent, 50);
        assert_eq!(progress.week_percent, 50);

        let progress = GoalProgress::new(15, 105, None);
        assert_eq!(progress.weekly_goal, None);
        assert_eq!(progress.week_percent, 0);
    }
}
