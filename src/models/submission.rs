// SPDX-License-Identifier: MIT

//! Weekly submission model.
//!
//! Stored at `users/{phone}/submissions/{week_id}`. Keying by week id is
//! what enforces at-most-one submission per (user, week).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's answers for one week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    /// Owning week (also the document ID)
    pub week_id: String,
    /// Denormalized display name for leaderboard queries
    pub user_name: String,
    /// Number of correct answers
    pub score: i64,
    /// Question id -> selected choice text
    pub answers: HashMap<String, String>,
    /// Seconds taken to complete the quiz
    pub time_taken: i64,
    /// When the submission was made (RFC3339)
    pub submitted_at: String,

    // ─── Migration provenance ────────────────────────────────────
    /// Set when this record was synthesized from v1 data
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub migrated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<String>,
    /// Previous week id, when renamed by the fix-week tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_from: Option<String>,
}
