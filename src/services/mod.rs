// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod genai;
pub mod leaderboard;
pub mod scoring;
pub mod submission;

pub use genai::{GeminiClient, GeneratedQuestion};
pub use leaderboard::{BoardKey, LeaderboardService};
pub use submission::submit_answers;
