// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Subcollection of `users`, keyed by week id
    pub const SUBMISSIONS: &str = "submissions";
    pub const QUESTIONS: &str = "questions";
    pub const WEEKS: &str = "weeks";
    pub const CONFIG: &str = "config";
    pub const LEADERBOARD_SNAPSHOTS: &str = "leaderboard_snapshots";
}

/// Document id of the singleton settings document in `config`.
pub const QUIZ_SETTINGS_DOC: &str = "quiz_settings";
