//! Water intake entries (`users/{uid}/waterIntake/{id}`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::parse_request_date;
use crate::db::{collections, Entry};
use crate::error::Result;
use crate::time_utils::format_utc_rfc3339;

/// Stored water intake document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Water {
    pub id: String,
    pub user_id: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub date: DateTime<Utc>,
    pub water_consumed_oz: u32,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Entry for Water {
    const COLLECTION: &'static str = collections::WATER_INTAKE;
    const LABEL: &'static str = "Water entry";

    fn id(&self) -> &str {
        &self.id
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WaterRequest {
    pub date: String,
    #[validate(range(min = 1, max = 1000, message = "Water consumed must be between 1 and 1000 oz"))]
    pub water_consumed_oz: i64,
}

impl WaterRequest {
    /// Validate the body and parse its date.
    pub fn check(&self) -> Result<DateTime<Utc>> {
        self.validate()?;
        parse_request_date(&self.date)
    }

    pub fn into_water(self, user_id: &str, now: DateTime<Utc>) -> Result<Water> {
        let date = self.check()?;
        Ok(Water {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date,
            water_consumed_oz: self.water_consumed_oz as u32,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(self, water: &mut Water, date: DateTime<Utc>, now: DateTime<Utc>) {
        water.date = date;
        water.water_consumed_oz = self.water_consumed_oz as u32;
        water.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct WaterResponse {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub water_consumed_oz: u32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Water> for WaterResponse {
    fn from(w: Water) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            date: format_utc_rfc3339(w.date),
            water_consumed_oz: w.water_consumed_oz,
            created_at: format_utc_rfc3339(w.created_at),
            updated_at: format_utc_rfc3339(w.updated_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_amount_must_be_positive() {
        let req = WaterRequest {
            date: "2024-05-01".to_string(),
            water_consumed_oz: 0,
        };
        assert!(req.into_water("u1", Utc::now()).is_err());

        let req = WaterRequest {
            date: "2024-05-01".to_string(),
            water_consumed_oz: 16,
        };
        let water = req.into_water("u1", Utc::now()).unwrap();
        assert_eq!(water.water_consumed_oz, 16);
    }
}
