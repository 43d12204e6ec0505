// SPDX-License-Identifier: MIT

//! Quiz question models.

use serde::{Deserialize, Serialize};

/// Question as stored in Firestore. `correct_answer` must equal one of
/// `options`; the store does not enforce this, admin input does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Document ID, populated on reads by the firestore crate
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: Option<String>,
    pub text: String,
    /// Exactly 4 choices
    pub options: Vec<String>,
    pub correct_answer: String,
    /// Presentation order within the week
    pub order: i64,
    /// Owning week; absent only on unmigrated v1 documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_id: Option<String>,
}

/// Question as served to quiz takers: no correct answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub order: i64,
}
