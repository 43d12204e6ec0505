// SPDX-License-Identifier: MIT

//! Singleton quiz settings document.

use serde::{Deserialize, Serialize};

/// Stored at `config/quiz_settings`. `Default` supplies the values the
/// public config endpoint reports when the document does not exist yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSettings {
    pub timer_duration_minutes: i64,
    pub quiz_active: bool,
    #[serde(default)]
    pub leaderboard_active: bool,
    /// Week pinned by the last leaderboard activation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_week_id: Option<String>,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            timer_duration_minutes: 10,
            quiz_active: true,
            leaderboard_active: false,
            current_week_id: None,
        }
    }
}
