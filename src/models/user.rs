// SPDX-License-Identifier: MIT

//! User model for storage and API.
//!
//! The v1 schema kept per-quiz state (`score`, `answers`, `submitted`, ...)
//! directly on the user document. v2 moves per-week state into the
//! `submissions` subcollection and tracks only `cumulative_score` here.
//! Legacy fields are modeled explicitly as optionals and are never deleted;
//! `cumulative_score: None` is what marks a user as not yet migrated.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User profile stored in Firestore, keyed by phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Phone number (also used as document ID)
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Phone number
    pub phone: String,
    /// Running total of per-week scores. Updated only via the store's
    /// atomic increment; absent on unmigrated v1 documents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_score: Option<i64>,
    /// When the user first registered (RFC3339)
    #[serde(default)]
    pub created_at: String,

    // ─── Legacy v1 fields (preserved, never deleted) ─────────────
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

impl User {
    /// Fresh v2 user with no quiz history.
    pub fn new(name: String, phone: String, created_at: String) -> Self {
        Self {
            user_id: phone.clone(),
            name,
            phone,
            cumulative_score: Some(0),
            created_at,
            score: None,
            answers: None,
            submitted: None,
            time_taken: None,
            week_id: None,
            submitted_at: None,
        }
    }

    /// Whether this document has been migrated to the v2 schema.
    pub fn is_migrated(&self) -> bool {
        self.cumulative_score.is_some()
    }

    /// Whether the user submitted under the legacy v1 flow.
    pub fn legacy_submitted(&self) -> bool {
        self.submitted.unwrap_or(false)
    }
}
