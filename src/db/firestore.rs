// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile + cumulative score)
//! - Submissions (per-week subcollection under each user)
//! - Questions (per-week question sets)
//! - Weeks, quiz settings, leaderboard snapshots

use crate::db::{collections, QUIZ_SETTINGS_DOC};
use crate::error::AppError;
use crate::models::{LeaderboardSnapshot, Question, QuizSettings, Submission, User, Week};
use crate::week;
use firestore::FirestoreQueryDirection;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

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

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by phone number.
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

    /// Create or update a user document.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Update only the given user fields, leaving the rest untouched.
    pub async fn update_user_fields(
        &self,
        user: &User,
        field_paths: Vec<String>,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(field_paths)
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Atomically add `delta` to a user's cumulative score.
    ///
    /// Uses a Firestore field transform, not read-modify-write, so
    /// concurrent submissions from different weeks cannot lose updates.
    pub async fn increment_cumulative_score(
        &self,
        user_id: &str,
        delta: i64,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .transforms(|t| t.fields([t.field("cumulative_score").increment(delta)]))
            .only_transform()
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(e.to_string()))?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Full user scan (migration toolkit, backups).
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Users ordered by cumulative score, highest first.
    pub async fn top_users_by_cumulative_score(&self, limit: u32) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([(
                "cumulative_score",
                FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Submission Operations ───────────────────────────────────

    /// Get one user's submission for one week.
    pub async fn get_submission(
        &self,
        user_id: &str,
        week_id: &str,
    ) -> Result<Option<Submission>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .by_id_in(collections::SUBMISSIONS)
            .parent(parent)
            .obj()
            .one(week_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write a submission, keyed by its week id.
    pub async fn set_submission(
        &self,
        user_id: &str,
        submission: &Submission,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        let _: () = client
            .fluent()
            .update()
            .in_col(collections::SUBMISSIONS)
            .document_id(&submission.week_id)
            .parent(parent)
            .object(submission)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a submission (fix-week rename only).
    pub async fn delete_submission(&self, user_id: &str, week_id: &str) -> Result<(), AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .delete()
            .from(collections::SUBMISSIONS)
            .parent(parent)
            .document_id(week_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All submissions for one user.
    pub async fn list_submissions_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<Submission>, AppError> {
        let client = self.get_client()?;
        let parent = client
            .parent_path(collections::USERS, user_id)
            .map_err(|e| AppError::Database(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collections::SUBMISSIONS)
            .parent(parent)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All submissions for one week, across all users (collection group).
    pub async fn list_submissions_for_week(
        &self,
        week_id: &str,
    ) -> Result<Vec<Submission>, AppError> {
        let week_id = week_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SUBMISSIONS)
            .all_descendants()
            .filter(move |q| q.for_all([q.field("week_id").eq(week_id.clone())]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Question Operations ─────────────────────────────────────

    /// Questions for one week, in presentation order.
    pub async fn questions_for_week(&self, week_id: &str) -> Result<Vec<Question>, AppError> {
        let week_id = week_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::QUESTIONS)
            .filter(move |q| q.for_all([q.field("week_id").eq(week_id.clone())]))
            .order_by([("order", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All questions, in presentation order (admin view, migration).
    pub async fn list_questions(&self) -> Result<Vec<Question>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::QUESTIONS)
            .order_by([("order", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a question.
    pub async fn upsert_question(&self, id: &str, question: &Question) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::QUESTIONS)
            .document_id(id)
            .object(question)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Update only a question's week id (migration, fix-week).
    pub async fn set_question_week_id(&self, id: &str, week_id: &str) -> Result<(), AppError> {
        let patch = Question {
            id: None,
            text: String::new(),
            options: vec![],
            correct_answer: String::new(),
            order: 0,
            week_id: Some(week_id.to_string()),
        };
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(["week_id"])
            .in_col(collections::QUESTIONS)
            .document_id(id)
            .object(&patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a question.
    pub async fn delete_question(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::QUESTIONS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Seed a question set in batches of transactional writes.
    pub async fn batch_upsert_questions(
        &self,
        questions: &[(String, Question)],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in questions.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for (id, question) in chunk {
                client
                    .fluent()
                    .update()
                    .in_col(collections::QUESTIONS)
                    .document_id(id)
                    .object(question)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add question to transaction: {}", e))
                    })?;
            }

            transaction
                .commit()
                .await
                .map_err(|e| AppError::Database(format!("Failed to commit batch: {}", e)))?;
        }

        Ok(())
    }

    /// Migrate one user: write `cumulative_score` and, when present,
    /// the synthesized legacy submission, in a single transaction.
    pub async fn apply_user_migration(
        &self,
        user: &User,
        legacy_submission: Option<&Submission>,
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .fields(["cumulative_score"])
            .in_col(collections::USERS)
            .document_id(&user.user_id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add user update to transaction: {}", e))
            })?;

        if let Some(submission) = legacy_submission {
            let parent = client
                .parent_path(collections::USERS, &user.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?;

            client
                .fluent()
                .update()
                .in_col(collections::SUBMISSIONS)
                .document_id(&submission.week_id)
                .parent(parent)
                .object(submission)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add submission to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(())
    }

    // ─── Week Operations ─────────────────────────────────────────

    /// Explicit schedule record for a week, if one exists.
    pub async fn get_week(&self, week_id: &str) -> Result<Option<Week>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WEEKS)
            .obj()
            .one(week_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All explicit week records.
    pub async fn list_weeks(&self) -> Result<Vec<Week>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WEEKS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Resolve the currently open week.
    ///
    /// The calendar week is active by default; an explicit record marked
    /// inactive closes it. Returns `None` when no quiz is open.
    pub async fn resolve_active_week(&self) -> Result<Option<String>, AppError> {
        let week_id = week::current_week_id();
        match self.get_week(&week_id).await? {
            Some(record) if !record.active => Ok(None),
            _ => Ok(Some(week_id)),
        }
    }

    // ─── Settings Operations ─────────────────────────────────────

    /// The singleton quiz settings document, if written yet.
    pub async fn get_settings(&self) -> Result<Option<QuizSettings>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CONFIG)
            .obj()
            .one(QUIZ_SETTINGS_DOC)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace the quiz settings document.
    pub async fn set_settings(&self, settings: &QuizSettings) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CONFIG)
            .document_id(QUIZ_SETTINGS_DOC)
            .object(settings)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Leaderboard Snapshot Operations ─────────────────────────

    /// Read the frozen ranking for a week.
    pub async fn get_snapshot(
        &self,
        week_id: &str,
    ) -> Result<Option<LeaderboardSnapshot>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::LEADERBOARD_SNAPSHOTS)
            .obj()
            .one(week_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Persist the frozen ranking for a week. The admin activation
    /// handler is the only caller.
    pub async fn set_snapshot(&self, snapshot: &LeaderboardSnapshot) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::LEADERBOARD_SNAPSHOTS)
            .document_id(&snapshot.week_id)
            .object(snapshot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
