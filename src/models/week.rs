// SPDX-License-Identifier: MIT

//! Explicit week schedule records.
//!
//! A week with no record is active by default during its calendar span;
//! a record exists only to override that (or to carry topic metadata).

use serde::{Deserialize, Serialize};

/// Stored in the `weeks` collection, keyed by week id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Week {
    pub week_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    /// Explicit override; `false` closes the quiz for this week
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_active() -> bool {
    true
}
