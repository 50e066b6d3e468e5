//! Database layer (Firestore).

pub mod firestore;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Subcollections under `users/{id}`
    pub const WORKOUTS: &str = "workouts";
    pub const WATER_INTAKE: &str = "waterIntake";
    pub const MEDITATIONS: &str = "meditations";
    pub const NOTES: &str = "notes";
}

/// A dated document stored in a subcollection of its owner's user document.
pub trait Entry: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Subcollection name under `users/{id}`.
    const COLLECTION: &'static str;
    /// Human-readable name used in error messages.
    const LABEL: &'static str;
    /// Firestore field that range queries filter and order on.
    const DATE_FIELD: &'static str = "date";

    fn id(&self) -> &str;
    fn date(&self) -> DateTime<Utc>;
}
