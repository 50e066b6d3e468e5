// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rewards that can be unlocked by spending points.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::models::User;

#[derive(Debug, Clone, Copy)]
pub struct Reward {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
}

pub const CATALOG: &[Reward] = &[
    Reward {
        id: "soundscape-ocean",
        name: "Ocean Waves",
        description: "Unlock the ocean soundscape for meditation",
        cost: 100,
    },
    Reward {
        id: "soundscape-forest",
        name: "Forest Morning",
        description: "Unlock the forest soundscape for meditation",
        cost: 100,
    },
    Reward {
        id: "theme-sunset",
        name: "Sunset Theme",
        description: "Warm color theme for the dashboard",
        cost: 150,
    },
    Reward {
        id: "badge-zen-master",
        name: "Zen Master Badge",
        description: "Profile badge for dedicated practitioners",
        cost: 300,
    },
];

pub fn find(id: &str) -> Option<&'static Reward> {
    CATALOG.iter().find(|r| r.id == id)
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RewardStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cost: u32,
    pub unlocked: bool,
    pub affordable: bool,
}

pub fn statuses(user: &User) -> Vec<RewardStatus> {
    CATALOG
        .iter()
        .map(|r| RewardStatus {
            id: r.id.to_string(),
            name: r.name.to_string(),
            description: r.description.to_string(),
            cost: r.cost,
            unlocked: user.unlocked_rewards.iter().any(|id| id == r.id),
            affordable: user.points >= r.cost,
        })
        .collect()
}

/// Spend exactly `reward.cost` points and unlock the reward.
///
/// Returns the remaining balance.
pub fn redeem(user: &mut User, reward: &Reward) -> Result<u32> {
    if user.unlocked_rewards.iter().any(|id| id == reward.id) {
        return Err(AppError::Conflict(format!(
            "Reward '{}' is already unlocked",
            reward.id
        )));
    }
    if user.points < reward.cost {
        return Err(AppError::BadRequest(format!(
            "Insufficient points: need {}, have {}",
            reward.cost, user.points
        )));
    }

    user.points -= reward.cost;
    user.unlocked_rewards.push(reward.id.to_string());
    Ok(user.points)
}
