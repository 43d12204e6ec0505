// SPDX-License-Identifier: MIT

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); they are skipped otherwise.

use std::collections::HashMap;
use weekly_quiz::models::{LeaderboardSnapshot, Question, QuizSettings, Submission, User, WeeklyEntry};

mod common;
use common::{test_db, unique_phone};

fn test_user(phone: &str) -> User {
    User::new("Test User".to_string(), phone.to_string(), "2026-01-05T10:00:00Z".to_string())
}

fn test_submission(week_id: &str, score: i64, time_taken: i64) -> Submission {
    Submission {
        week_id: week_id.to_string(),
        user_name: "Test User".to_string(),
        score,
        answers: HashMap::from([("q1".to_string(), "Paris".to_string())]),
        time_taken,
        submitted_at: "2026-01-05T10:05:00Z".to_string(),
        migrated: false,
        migrated_at: None,
        fixed_from: None,
    }
}

// ─── Users ───────────────────────────────────────────────────

#[tokio::test]
async fn test_user_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let phone = unique_phone();

    let before = db.get_user(&phone).await.unwrap();
    assert!(before.is_none(), "User should not exist before creation");

    db.upsert_user(&test_user(&phone)).await.unwrap();

    let fetched = db.get_user(&phone).await.unwrap().unwrap();
    assert_eq!(fetched.user_id, phone);
    assert_eq!(fetched.name, "Test User");
    assert_eq!(fetched.cumulative_score, Some(0));
    assert!(fetched.score.is_none(), "Fresh users carry no legacy fields");
}

#[tokio::test]
async fn test_cumulative_score_increment() {
    require_emulator!();

    let db = test_db().await;
    let phone = unique_phone();
    db.upsert_user(&test_user(&phone)).await.unwrap();

    db.increment_cumulative_score(&phone, 3).await.unwrap();
    db.increment_cumulative_score(&phone, 4).await.unwrap();

    let user = db.get_user(&phone).await.unwrap().unwrap();
    assert_eq!(user.cumulative_score, Some(7));
}

// ─── Submissions ─────────────────────────────────────────────

#[tokio::test]
async fn test_submission_subcollection_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let phone = unique_phone();
    db.upsert_user(&test_user(&phone)).await.unwrap();

    assert!(db.get_submission(&phone, "2026-W02").await.unwrap().is_none());

    db.set_submission(&phone, &test_submission("2026-W02", 4, 120))
        .await
        .unwrap();

    let fetched = db.get_submission(&phone, "2026-W02").await.unwrap().unwrap();
    assert_eq!(fetched.score, 4);
    assert_eq!(fetched.time_taken, 120);
    assert_eq!(fetched.answers.get("q1"), Some(&"Paris".to_string()));

    // One document per week; writing again replaces, not duplicates
    db.set_submission(&phone, &test_submission("2026-W02", 5, 90))
        .await
        .unwrap();
    let all = db.list_submissions_for_user(&phone).await.unwrap();
    assert_eq!(all.iter().filter(|s| s.week_id == "2026-W02").count(), 1);
}

#[tokio::test]
async fn test_collection_group_query_finds_week_submissions() {
    require_emulator!();

    let db = test_db().await;
    // Unique week id keeps this test isolated from other runs
    let week_id = format!("2090-W{:02}", (std::process::id() % 50) + 1);

    let phone_a = unique_phone();
    let phone_b = unique_phone();
    db.upsert_user(&test_user(&phone_a)).await.unwrap();
    db.upsert_user(&test_user(&phone_b)).await.unwrap();
    db.set_submission(&phone_a, &test_submission(&week_id, 3, 100))
        .await
        .unwrap();
    db.set_submission(&phone_b, &test_submission(&week_id, 5, 80))
        .await
        .unwrap();

    let found = db.list_submissions_for_week(&week_id).await.unwrap();
    assert!(found.len() >= 2, "Both submissions should be found");
    assert!(found.iter().all(|s| s.week_id == week_id));
}

#[tokio::test]
async fn test_delete_submission() {
    require_emulator!();

    let db = test_db().await;
    let phone = unique_phone();
    db.upsert_user(&test_user(&phone)).await.unwrap();
    db.set_submission(&phone, &test_submission("2026-W03", 2, 60))
        .await
        .unwrap();

    db.delete_submission(&phone, "2026-W03").await.unwrap();
    assert!(db.get_submission(&phone, "2026-W03").await.unwrap().is_none());
}

// ─── Questions ───────────────────────────────────────────────

#[tokio::test]
async fn test_questions_for_week_ordered() {
    require_emulator!();

    let db = test_db().await;
    let week_id = "2091-W07";

    let make = |text: &str, order: i64| Question {
        id: None,
        text: text.to_string(),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer: "A".to_string(),
        order,
        week_id: Some(week_id.to_string()),
    };

    // Write out of order
    db.upsert_question("itest-q2", &make("Second", 2)).await.unwrap();
    db.upsert_question("itest-q1", &make("First", 1)).await.unwrap();
    db.upsert_question("itest-q3", &make("Third", 3)).await.unwrap();

    let questions = db.questions_for_week(week_id).await.unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0].text, "First");
    assert_eq!(questions[1].text, "Second");
    assert_eq!(questions[2].text, "Third");
    assert_eq!(questions[0].id.as_deref(), Some("itest-q1"));

    for id in ["itest-q1", "itest-q2", "itest-q3"] {
        db.delete_question(id).await.unwrap();
    }
}

#[tokio::test]
async fn test_set_question_week_id_preserves_other_fields() {
    require_emulator!();

    let db = test_db().await;
    let question = Question {
        id: None,
        text: "Orphan question".to_string(),
        options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_answer: "B".to_string(),
        order: 9,
        week_id: None,
    };
    db.upsert_question("itest-orphan", &question).await.unwrap();

    db.set_question_week_id("itest-orphan", "2025-W51").await.unwrap();

    let all = db.list_questions().await.unwrap();
    let updated = all
        .iter()
        .find(|q| q.id.as_deref() == Some("itest-orphan"))
        .expect("question should exist");
    assert_eq!(updated.week_id.as_deref(), Some("2025-W51"));
    assert_eq!(updated.text, "Orphan question");
    assert_eq!(updated.correct_answer, "B");

    db.delete_question("itest-orphan").await.unwrap();
}

// ─── Settings and snapshots ──────────────────────────────────

#[tokio::test]
async fn test_settings_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let settings = QuizSettings {
        timer_duration_minutes: 15,
        quiz_active: false,
        leaderboard_active: true,
        current_week_id: Some("2026-W04".to_string()),
    };
    db.set_settings(&settings).await.unwrap();

    let fetched = db.get_settings().await.unwrap().unwrap();
    assert_eq!(fetched.timer_duration_minutes, 15);
    assert!(!fetched.quiz_active);
    assert!(fetched.leaderboard_active);
    assert_eq!(fetched.current_week_id.as_deref(), Some("2026-W04"));
}

#[tokio::test]
async fn test_snapshot_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let snapshot = LeaderboardSnapshot {
        week_id: "2092-W10".to_string(),
        created_at: "2026-03-09T12:00:00Z".to_string(),
        rankings: vec![
            WeeklyEntry {
                rank: 1,
                name: "Alice".to_string(),
                score: 5,
                time_taken: 90,
                week_id: "2092-W10".to_string(),
            },
            WeeklyEntry {
                rank: 2,
                name: "Bob".to_string(),
                score: 4,
                time_taken: 120,
                week_id: "2092-W10".to_string(),
            },
        ],
    };
    db.set_snapshot(&snapshot).await.unwrap();

    let fetched = db.get_snapshot("2092-W10").await.unwrap().unwrap();
    assert_eq!(fetched.rankings.len(), 2);
    assert_eq!(fetched.rankings[0].name, "Alice");
    assert_eq!(fetched.rankings[0].rank, 1);

    assert!(db.get_snapshot("2092-W11").await.unwrap().is_none());
}
