// SPDX-License-Identifier: MIT

//! v1 -> v2 schema migration: planning, validation, and reporting.
//!
//! Everything here is pure over in-memory documents; `bin/migrate.rs`
//! does the store IO. Mutations are planned first and applied through
//! [`WriteMode`], so the dry-run and execute paths share one code path
//! and cannot diverge.
//!
//! The migration is non-destructive: v1 fields are added to, never
//! deleted. Presence of `cumulative_score` (users) or `week_id`
//! (questions) marks a document as already migrated, which is what makes
//! re-running safe.

use crate::error::AppError;
use crate::models::{Question, Submission, User};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;

/// Week id assigned to all pre-weekly data.
pub const LEGACY_WEEK_ID: &str = "2025-W51";

/// Dry-run/execute switch. Every mutating step goes through [`apply`],
/// which either runs the operation or logs what it would have done.
///
/// [`apply`]: WriteMode::apply
#[derive(Debug, Clone, Copy)]
pub struct WriteMode {
    pub commit: bool,
}

impl WriteMode {
    pub fn dry_run() -> Self {
        Self { commit: false }
    }

    pub fn execute() -> Self {
        Self { commit: true }
    }

    pub fn label(&self) -> &'static str {
        if self.commit {
            "EXECUTING"
        } else {
            "DRY RUN"
        }
    }

    /// Run `op` when committing; log and skip otherwise.
    pub async fn apply<F, Fut>(&self, what: &str, op: F) -> Result<(), AppError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), AppError>>,
    {
        if self.commit {
            op().await
        } else {
            tracing::info!(action = what, "Dry run: skipped");
            Ok(())
        }
    }
}

// ─── Migration planning ──────────────────────────────────────────

/// Planned changes for one unmigrated user.
#[derive(Debug, Clone)]
pub struct UserMigration {
    /// User with `cumulative_score` filled from the legacy score
    pub user: User,
    /// Synthesized legacy-week submission, when the user had submitted
    pub legacy_submission: Option<Submission>,
}

/// Plan the v2 upgrade for a user. `None` when already migrated.
pub fn plan_user_migration(user: &User, now: &str) -> Option<UserMigration> {
    if user.is_migrated() {
        return None;
    }

    let legacy_score = user.score.unwrap_or(0);

    let legacy_submission = user.legacy_submitted().then(|| Submission {
        week_id: LEGACY_WEEK_ID.to_string(),
        user_name: user.name.clone(),
        score: legacy_score,
        answers: user.answers.clone().unwrap_or_default(),
        time_taken: user.time_taken.unwrap_or(0),
        submitted_at: user
            .submitted_at
            .clone()
            .unwrap_or_else(|| now.to_string()),
        migrated: true,
        migrated_at: Some(now.to_string()),
        fixed_from: None,
    });

    let mut user = user.clone();
    user.cumulative_score = Some(legacy_score);

    Some(UserMigration {
        user,
        legacy_submission,
    })
}

/// Whether a question still needs its legacy week id assigned.
pub fn question_needs_week_id(question: &Question) -> bool {
    question.week_id.is_none()
}

/// Rename a submission's week, keeping provenance of the old id.
pub fn rename_submission(submission: &Submission, new_week_id: &str) -> Submission {
    let mut renamed = submission.clone();
    renamed.fixed_from = Some(submission.week_id.clone());
    renamed.week_id = new_week_id.to_string();
    renamed
}

/// Counters reported by the migrate operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MigrationStats {
    pub total_users: usize,
    pub already_migrated: usize,
    pub users_migrated: usize,
    pub submissions_created: usize,
    pub questions_migrated: usize,
}

// ─── Validation ──────────────────────────────────────────────────

/// Audit one user against the v2 invariants.
///
/// `submissions` is the full content of the user's subcollection.
pub fn validate_user(user: &User, submissions: &[Submission]) -> Vec<String> {
    let mut issues = Vec::new();
    let who = format!("{} ({})", user.name, user.user_id);

    let Some(cumulative) = user.cumulative_score else {
        issues.push(format!("User {}: missing cumulative_score", who));
        return issues;
    };

    if let Some(legacy_score) = user.score {
        if legacy_score != cumulative && submissions.len() <= 1 {
            issues.push(format!(
                "User {}: score mismatch (legacy: {}, cumulative: {})",
                who, legacy_score, cumulative
            ));
        }
    }

    if user.legacy_submitted() {
        if submissions.is_empty() {
            issues.push(format!(
                "User {}: submitted but no submission documents found",
                who
            ));
        } else if let Some(legacy) = submissions.iter().find(|s| s.week_id == LEGACY_WEEK_ID) {
            if Some(legacy.score) != user.score {
                issues.push(format!(
                    "User {}: submission score mismatch in week {}",
                    who, legacy.week_id
                ));
            }
        }
    }

    issues
}

/// Audit one question: it must carry a week id.
pub fn validate_question(id: &str, question: &Question) -> Option<String> {
    question
        .week_id
        .is_none()
        .then(|| format!("Question {}: missing week_id", id))
}

// ─── Check report ────────────────────────────────────────────────

/// Read-only database summary for human inspection.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CheckReport {
    pub total_users: usize,
    pub users_with_cumulative: usize,
    pub total_submissions: usize,
    /// Submissions per week id
    pub submission_weeks: BTreeMap<String, usize>,
    pub total_questions: usize,
    pub questions_without_week: usize,
    /// Questions per week id
    pub question_weeks: BTreeMap<String, usize>,
}

/// Summarize migration state across all users and questions.
pub fn build_check_report(
    users: &[(User, Vec<Submission>)],
    questions: &[Question],
) -> CheckReport {
    let mut report = CheckReport {
        total_users: users.len(),
        total_questions: questions.len(),
        ..Default::default()
    };

    for (user, submissions) in users {
        if user.is_migrated() {
            report.users_with_cumulative += 1;
        }
        for submission in submissions {
            report.total_submissions += 1;
            *report
                .submission_weeks
                .entry(submission.week_id.clone())
                .or_insert(0) += 1;
        }
    }

    for question in questions {
        match &question.week_id {
            Some(week_id) => {
                *report.question_weeks.entry(week_id.clone()).or_insert(0) += 1;
            }
            None => report.questions_without_week += 1,
        }
    }

    report
}

// ─── Backup format ───────────────────────────────────────────────

/// On-disk backup shape: all users with their nested submissions,
/// plus all questions.
#[derive(Debug, Serialize)]
pub struct Backup {
    pub backup_timestamp: String,
    pub project: String,
    pub users: Vec<BackupUser>,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize)]
pub struct BackupUser {
    #[serde(flatten)]
    pub user: User,
    pub submissions: Vec<Submission>,
}
