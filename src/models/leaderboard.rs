// SPDX-License-Identifier: MIT

//! Leaderboard entry and snapshot models.

use serde::{Deserialize, Serialize};

/// One row of a weekly leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyEntry {
    /// 1-based position, assigned by the builder
    #[serde(default)]
    pub rank: u32,
    pub name: String,
    pub score: i64,
    pub time_taken: i64,
    pub week_id: String,
}

/// One row of the all-time leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallEntry {
    #[serde(default)]
    pub rank: u32,
    pub name: String,
    pub cumulative_score: i64,
    /// Average time-taken across all of this user's submissions (seconds)
    pub avg_time_taken: f64,
    pub weeks_played: u32,
}

/// Frozen weekly ranking, written once per admin activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    pub week_id: String,
    pub created_at: String,
    pub rankings: Vec<WeeklyEntry>,
}
