//! User model for storage and API.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::config::TRIAL_DAYS;
use crate::time_utils::format_utc_rfc3339;

/// Subscription tier. The three states are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Trial,
    Premium,
}

/// Optional daily targets configured by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserGoals {
    #[validate(range(min = 1, message = "Exercise goal must be at least 1 minute"))]
    pub exercise_goal_minutes: Option<u32>,
    #[validate(range(min = 1, message = "Water goal must be at least 1 oz"))]
    pub water_goal_oz: Option<u32>,
    #[validate(range(min = 1, message = "Meditation goal must be at least 1 minute"))]
    pub meditation_goal_minutes: Option<u32>,
}

/// User document stored in Firestore at `users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,

    // ─── Goals ───────────────────────────────────────────────────
    #[serde(default)]
    pub exercise_goal_minutes: Option<u32>,
    #[serde(default)]
    pub water_goal_oz: Option<u32>,
    #[serde(default)]
    pub meditation_goal_minutes: Option<u32>,

    // ─── Subscription ────────────────────────────────────────────
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub trial_start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub trial_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stripe_customer_id: Option<String>,

    // ─── Gamification ────────────────────────────────────────────
    #[serde(default)]
    pub points: u32,
    /// Challenge id -> period key of the last claim
    #[serde(default)]
    pub challenges: HashMap<String, String>,
    #[serde(default)]
    pub unlocked_rewards: Vec<String>,

    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new user that starts on the free premium trial.
    pub fn new_with_trial(
        username: String,
        email: String,
        hashed_password: String,
        first_name: String,
        last_name: String,
        goals: UserGoals,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            email,
            hashed_password,
            first_name,
            last_name,
            exercise_goal_minutes: goals.exercise_goal_minutes,
            water_goal_oz: goals.water_goal_oz,
            meditation_goal_minutes: goals.meditation_goal_minutes,
            subscription_status: SubscriptionStatus::Trial,
            trial_start_date: Some(now),
            trial_end_date: Some(now + Duration::days(TRIAL_DAYS)),
            stripe_customer_id: None,
            points: 0,
            challenges: HashMap::new(),
            unlocked_rewards: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn goals(&self) -> UserGoals {
        UserGoals {
            exercise_goal_minutes: self.exercise_goal_minutes,
            water_goal_oz: self.water_goal_oz,
            meditation_goal_minutes: self.meditation_goal_minutes,
        }
    }

    /// Whether premium features are available at `now`.
    ///
    /// Trial users count as premium until the trial end date.
    pub fn is_premium(&self, now: DateTime<Utc>) -> bool {
        match self.subscription_status {
            SubscriptionStatus::Premium => true,
            SubscriptionStatus::Trial => self.trial_end_date.is_some_and(|end| now < end),
            SubscriptionStatus::Free => false,
        }
    }

    /// Whole days left in the trial, or 0 outside of a running trial.
    pub fn trial_days_remaining(&self, now: DateTime<Utc>) -> i64 {
        match (self.subscription_status, self.trial_end_date) {
            (SubscriptionStatus::Trial, Some(end)) if now < end => {
                let remaining = end - now;
                // Round partial days up so "ends in 3h" reads as 1 day left
                (remaining.num_seconds() + 86_399) / 86_400
            }
            _ => 0,
        }
    }

    /// Public profile (hides email, password hash and timestamps).
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            goals: self.goals(),
        }
    }

    /// Full view for the owner of the account.
    pub fn to_session(&self, now: DateTime<Utc>) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            goals: self.goals(),
            subscription: self.subscription_view(now),
            points: self.points,
            unlocked_rewards: self.unlocked_rewards.clone(),
            created_at: format_utc_rfc3339(self.created_at),
        }
    }

    pub fn subscription_view(&self, now: DateTime<Utc>) -> SubscriptionView {
        SubscriptionView {
            status: self.subscription_status,
            is_premium: self.is_premium(now),
            trial_start_date: self.trial_start_date.map(format_utc_rfc3339),
            trial_end_date: self.trial_end_date.map(format_utc_rfc3339),
            trial_days_remaining: self.trial_days_remaining(now),
        }
    }
}

/// Default-scope user view.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub goals: UserGoals,
}

/// Subscription state as seen by the client.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub status: SubscriptionStatus,
    pub is_premium: bool,
    pub trial_start_date: Option<String>,
    pub trial_end_date: Option<String>,
    pub trial_days_remaining: i64,
}

/// Logged-in user's own view.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub goals: UserGoals,
    pub subscription: SubscriptionView,
    pub points: u32,
    pub unlocked_rewards: Vec<String>,
    pub created_at: String,
}

// ─── Requests ────────────────────────────────────────────────

/// Usernames must not look like an email address.
fn validate_not_email(username: &str) -> Result<(), ValidationError> {
    if username.contains('@') {
        let mut err = ValidationError::new("username_is_email");
        err.message = Some("Username cannot be an email".into());
        return Err(err);
    }
    Ok(())
}

/// Sign-up request body.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(
        length(min = 4, max = 30, message = "Username must be 4-30 characters"),
        custom(function = "validate_not_email")
    )]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default, flatten)]
    #[validate(nested)]
    pub goals: UserGoals,
}

impl SignupRequest {
    /// Trim the identity fields and lowercase the email. Runs before
    /// validation so whitespace cannot satisfy the length rules.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self
    }
}

/// Profile update request body. Absent fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,
    #[validate(range(min = 1, message = "Exercise goal must be at least 1 minute"))]
    pub exercise_goal_minutes: Option<u32>,
    #[validate(range(min = 1, message = "Water goal must be at least 1 oz"))]
    pub water_goal_oz: Option<u32>,
    #[validate(range(min = 1, message = "Meditation goal must be at least 1 minute"))]
    pub meditation_goal_minutes: Option<u32>,
}

impl UpdateUserRequest {
    /// Trim the name fields before validation.
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.map(|name| name.trim().to_string());
        self.last_name = self.last_name.map(|name| name.trim().to_string());
        self
    }

    /// Apply the present fields onto `user`.
    pub fn apply(self, user: &mut User, now: DateTime<Utc>) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(goal) = self.exercise_goal_minutes {
            user.exercise_goal_minutes = Some(goal);
        }
        if let Some(goal) = self.water_goal_oz {
            user.water_goal_oz = Some(goal);
        }
        if let Some(goal) = self.meditation_goal_minutes {
            user.meditation_goal_minutes = Some(goal);
        }
        user.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trial_user(now: DateTime<Utc>) -> User {
        User::new_with_trial(
            "calmcat".to_string(),
            "cat@example.com".to_string(),
            "hash".to_string(),
            "Calm".to_string(),
            "Cat".to_string(),
            UserGoals::default(),
            now,
        )
    }

    fn signup(username: &str) -> SignupRequest {
        SignupRequest {
            username: username.to_string(),
            email: "cat@example.com".to_string(),
            password: "secret123".to_string(),
            first_name: "Calm".to_string(),
            last_name: "Cat".to_string(),
            goals: UserGoals::default(),
        }
    }

    #[test]
    fn test_trial_is_premium_until_end_date() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let user = trial_user(start);

        assert_eq!(user.subscription_status, SubscriptionStatus::Trial);
        assert!(user.is_premium(start));
        assert!(user.is_premium(start + Duration::days(13)));

        let end = user.trial_end_date.unwrap();
        assert_eq!(end, start + Duration::days(14));
        assert!(!user.is_premium(end));
        assert!(!user.is_premium(end + Duration::seconds(1)));
    }

    #[test]
    fn test_premium_and_free_ignore_trial_dates() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let mut user = trial_user(start);
        let later = start + Duration::days(60);

        user.subscription_status = SubscriptionStatus::Premium;
        assert!(user.is_premium(later));

        user.subscription_status = SubscriptionStatus::Free;
        assert!(!user.is_premium(start));
    }

    #[test]
    fn test_trial_days_remaining_rounds_up() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let user = trial_user(start);

        assert_eq!(user.trial_days_remaining(start), 14);
        assert_eq!(
            user.trial_days_remaining(start + Duration::days(13) + Duration::hours(21)),
            1
        );
        assert_eq!(user.trial_days_remaining(start + Duration::days(20)), 0);
    }

    #[test]
    fn test_username_with_at_sign_is_rejected() {
        let errors = signup("cat@example.com").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));

        assert!(signup("calmcat").validate().is_ok());
    }

    #[test]
    fn test_invalid_email_and_short_password_rejected() {
        let mut req = signup("calmcat");
        req.email = "not-an-email".to_string();
        req.password = "abc".to_string();

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_blank_identity_fields_rejected_after_trim() {
        let mut req = signup("    ");
        req.first_name = " ".to_string();
        req.email = "  Cat@Example.COM ".to_string();

        let req = req.normalized();
        assert_eq!(req.email, "cat@example.com");

        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("first_name"));
        assert!(!fields.contains_key("email"));

        let padded = signup("  ab  ").normalized();
        assert!(padded.validate().is_err());
        assert!(signup("  calmcat  ").normalized().validate().is_ok());
    }

    #[test]
    fn test_blank_profile_name_rejected_after_trim() {
        let req = UpdateUserRequest {
            first_name: Some("   ".to_string()),
            last_name: None,
            exercise_goal_minutes: None,
            water_goal_oz: None,
            meditation_goal_minutes: None,
        };
        assert!(req.normalized().validate().is_err());
    }

    #[test]
    fn test_zero_goal_rejected() {
        let mut req = signup("calmcat");
        req.goals.water_goal_oz = Some(0);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_public_view_hides_private_fields() {
        let user = trial_user(Utc::now());
        let json = serde_json::to_value(user.to_public()).unwrap();

        assert_eq!(json["username"], "calmcat");
        assert!(json.get("email").is_none());
        assert!(json.get("hashedPassword").is_none());
        assert!(json.get("createdAt").is_none());
    }

    #[test]
    fn test_update_request_applies_only_present_fields() {
        let now = Utc::now();
        let mut user = trial_user(now);
        let update = UpdateUserRequest {
            first_name: None,
            last_name: Some("Dog".to_string()),
            exercise_goal_minutes: Some(30),
            water_goal_oz: None,
            meditation_goal_minutes: None,
        };

        update.apply(&mut user, now);

        assert_eq!(user.first_name, "Calm");
        assert_eq!(user.last_name, "Dog");
        assert_eq!(user.exercise_goal_minutes, Some(30));
        assert_eq!(user.water_goal_oz, None);
    }
}
