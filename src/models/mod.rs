// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod leaderboard;
pub mod question;
pub mod settings;
pub mod submission;
pub mod user;
pub mod week;

pub use leaderboard::{LeaderboardSnapshot, OverallEntry, WeeklyEntry};
pub use question::{PublicQuestion, Question};
pub use settings::QuizSettings;
pub use submission::Submission;
pub use user::User;
pub use week::Week;
