// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (`users/{id}`, profile, subscription and points)
//! - Entries (workouts, water intake, meditations and notes stored as
//!   subcollections of the owning user document)

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};

use crate::db::{collections, Entry};
use crate::error::AppError;
use crate::models::{Meditation, Note, User, Water, Workout};

const MAX_CONCURRENT_DB_OPS: usize = 8;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;
// Read-modify-write attempts before a contended transaction gives up.
const MAX_TRANSACTION_ATTEMPTS: u32 = 3;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Document path of `users/{user_id}`, the parent of all entry subcollections.
    fn user_path(&self, user_id: &str) -> Result<firestore::ParentPathBuilder, AppError> {
        self.get_client()?
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by document ID.
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by an exact field match (`username` or `email`).
    async fn find_user_by(&self, field: &'static str, value: &str) -> Result<Option<User>, AppError> {
        let value = value.to_string();
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.for_all([q.field(field).eq(value.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.find_user_by("username", username).await
    }

    /// Emails are stored lowercased, so callers pass a normalized address.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_user_by("email", email).await
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically read-modify-write a user document.
    ///
    /// The user is read inside the transaction, so a concurrent write to the
    /// same document aborts the commit and the whole read-modify-write is
    /// retried against the fresh document (up to `MAX_TRANSACTION_ATTEMPTS`).
    /// If the closure returns an error the transaction is rolled back and
    /// nothing is written.
    pub async fn update_user_atomic<T, F>(
        &self,
        user_id: &str,
        mut apply: F,
    ) -> Result<T, AppError>
    where
        F: FnMut(&mut User) -> Result<T, AppError>,
    {
        let client = self.get_client()?;
        let mut attempt = 1;

        loop {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            let tx_client = client.clone_with_consistency_selector(
                firestore::FirestoreConsistencySelector::Transaction(
                    transaction.transaction_id().clone(),
                ),
            );

            let current: Option<User> = match tx_client
                .fluent()
                .select()
                .by_id_in(collections::USERS)
                .obj()
                .one(user_id)
                .await
            {
                Ok(current) => current,
                Err(e) => {
                    let _ = transaction.rollback().await;
                    return Err(AppError::Database(format!(
                        "Failed to read user in transaction: {}",
                        e
                    )));
                }
            };

            let Some(mut user) = current else {
                let _ = transaction.rollback().await;
                return Err(AppError::NotFound("User not found".to_string()));
            };

            let result = match apply(&mut user) {
                Ok(result) => result,
                Err(e) => {
                    let _ = transaction.rollback().await;
                    return Err(e);
                }
            };
            user.updated_at = chrono::Utc::now();

            client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(&user.id)
                .object(&user)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add user to transaction: {}", e))
                })?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(user_id, attempt, "User updated atomically");
                    return Ok(result);
                }
                Err(firestore::errors::FirestoreError::DatabaseError(ref e))
                    if e.retry_possible && attempt < MAX_TRANSACTION_ATTEMPTS =>
                {
                    tracing::warn!(user_id, attempt, error = %e, "Transaction contended, retrying");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AppError::Database(format!("Transaction commit failed: {}", e)));
                }
            }
        }
    }

    // ─── Entry Operations ────────────────────────────────────────

    /// Create or replace an entry under `users/{user_id}`.
    pub async fn set_entry<E: Entry>(&self, user_id: &str, entry: &E) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(E::COLLECTION)
            .document_id(entry.id())
            .parent(&parent)
            .object(entry)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get one entry owned by `user_id`.
    ///
    /// Entries live under their owner, so an ID belonging to another user is
    /// simply not found.
    pub async fn get_entry<E: Entry>(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<Option<E>, AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(E::COLLECTION)
            .parent(&parent)
            .obj()
            .one(entry_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All entries for a user, newest first.
    pub async fn list_entries<E: Entry>(&self, user_id: &str) -> Result<Vec<E>, AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(E::COLLECTION)
            .parent(&parent)
            .order_by([(E::DATE_FIELD, firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Entries dated within the half-open window `[start, end)`, oldest first.
    pub async fn list_entries_between<E: Entry>(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<E>, AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .select()
            .from(E::COLLECTION)
            .parent(&parent)
            .filter(move |q| {
                q.for_all([
                    q.field(E::DATE_FIELD)
                        .greater_than_or_equal(firestore::FirestoreTimestamp(start)),
                    q.field(E::DATE_FIELD)
                        .less_than(firestore::FirestoreTimestamp(end)),
                ])
            })
            .order_by([(E::DATE_FIELD, firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete one entry owned by `user_id`.
    pub async fn delete_entry<E: Entry>(&self, user_id: &str, entry_id: &str) -> Result<(), AppError> {
        let parent = self.user_path(user_id)?;
        self.get_client()?
            .fluent()
            .delete()
            .from(E::COLLECTION)
            .document_id(entry_id)
            .parent(&parent)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Delete every entry of one kind for a user, in transaction-sized chunks.
    async fn delete_all_entries<E: Entry>(&self, user_id: &str) -> Result<usize, AppError> {
        let client = self.get_client()?;
        let parent = self.user_path(user_id)?;
        let entries: Vec<E> = self.list_entries(user_id).await?;

        for chunk in entries.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for entry in chunk {
                client
                    .fluent()
                    .delete()
                    .from(E::COLLECTION)
                    .document_id(entry.id())
                    .parent(&parent)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            E::COLLECTION,
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        tracing::debug!(
            user_id,
            collection = E::COLLECTION,
            count = entries.len(),
            "Deleted entries"
        );
        Ok(entries.len())
    }

    // ─── User Data Deletion ────────────────────────────────────────

    /// Delete a user and ALL of their entries.
    ///
    /// Firestore does not cascade subcollection deletes, so each entry
    /// subcollection is cleared before the user document itself.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, user_id: &str) -> Result<usize, AppError> {
        let collections_deleted = stream::iter(0..4)
            .map(|kind| async move {
                match kind {
                    0 => self.delete_all_entries::<Workout>(user_id).await,
                    1 => self.delete_all_entries::<Water>(user_id).await,
                    2 => self.delete_all_entries::<Meditation>(user_id).await,
                    _ => self.delete_all_entries::<Note>(user_id).await,
                }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<usize, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<usize>, AppError>>()?;

        let mut deleted_count: usize = collections_deleted.iter().sum();

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(user_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;

        tracing::info!(user_id, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
