// SPDX-License-Identifier: MIT

use std::sync::Arc;
use weekly_quiz::config::Config;
use weekly_quiz::db::FirestoreDb;
use weekly_quiz::routes::create_router;
use weekly_quiz::services::LeaderboardService;
use weekly_quiz::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with an offline mock store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = test_db_offline();
    let leaderboard = LeaderboardService::new();

    let state = Arc::new(AppState {
        config,
        db,
        leaderboard,
    });

    (create_router(state.clone()), state)
}

/// Unique per-test identity so emulator runs don't collide.
#[allow(dead_code)]
pub fn unique_phone() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("+1{:012}", nanos % 1_000_000_000_000)
}
