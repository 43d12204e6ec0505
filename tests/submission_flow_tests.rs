// SPDX-License-Identifier: MIT

//! End-to-end submission flow against the Firestore emulator:
//! register, answer, score, duplicate rejection, and the weekly
//! leaderboard reflecting the result.

use std::collections::HashMap;
use weekly_quiz::error::AppError;
use weekly_quiz::models::{Question, User};
use weekly_quiz::services::{submit_answers, LeaderboardService};

mod common;
use common::{test_db, unique_phone};

async fn seed_week(db: &weekly_quiz::db::FirestoreDb, week_id: &str) {
    let questions = vec![
        (
            format!("{}-q1", week_id),
            Question {
                id: None,
                text: "What is the capital of France?".to_string(),
                options: vec!["London".into(), "Berlin".into(), "Paris".into(), "Madrid".into()],
                correct_answer: "Paris".to_string(),
                order: 1,
                week_id: Some(week_id.to_string()),
            },
        ),
        (
            format!("{}-q2", week_id),
            Question {
                id: None,
                text: "Which planet is known as the Red Planet?".to_string(),
                options: vec!["Venus".into(), "Mars".into(), "Jupiter".into(), "Saturn".into()],
                correct_answer: "Mars".to_string(),
                order: 2,
                week_id: Some(week_id.to_string()),
            },
        ),
    ];
    db.batch_upsert_questions(&questions).await.unwrap();
}

fn answers(week_id: &str, first: &str, second: &str) -> HashMap<String, String> {
    HashMap::from([
        (format!("{}-q1", week_id), first.to_string()),
        (format!("{}-q2", week_id), second.to_string()),
    ])
}

#[tokio::test]
async fn test_submit_scores_and_increments_cumulative() {
    require_emulator!();

    let db = test_db().await;
    let leaderboard = LeaderboardService::new();
    let week_id = "2093-W20";
    seed_week(&db, week_id).await;

    let phone = unique_phone();
    let user = User::new("Flow Tester".to_string(), phone.clone(), "2026-05-11T09:00:00Z".to_string());
    db.upsert_user(&user).await.unwrap();

    // One right, one wrong
    let score = submit_answers(
        &db,
        &leaderboard,
        &phone,
        week_id,
        answers(week_id, "Paris", "Venus"),
        85,
    )
    .await
    .unwrap();
    assert_eq!(score, 1);

    let stored = db.get_submission(&phone, week_id).await.unwrap().unwrap();
    assert_eq!(stored.score, 1);
    assert_eq!(stored.time_taken, 85);
    assert_eq!(stored.user_name, "Flow Tester");

    let after = db.get_user(&phone).await.unwrap().unwrap();
    assert_eq!(after.cumulative_score, Some(1));
}

#[tokio::test]
async fn test_duplicate_submission_rejected() {
    require_emulator!();

    let db = test_db().await;
    let leaderboard = LeaderboardService::new();
    let week_id = "2093-W21";
    seed_week(&db, week_id).await;

    let phone = unique_phone();
    let user = User::new("Repeat Tester".to_string(), phone.clone(), "2026-05-18T09:00:00Z".to_string());
    db.upsert_user(&user).await.unwrap();

    submit_answers(
        &db,
        &leaderboard,
        &phone,
        week_id,
        answers(week_id, "Paris", "Mars"),
        60,
    )
    .await
    .unwrap();

    let err = submit_answers(
        &db,
        &leaderboard,
        &phone,
        week_id,
        answers(week_id, "Paris", "Mars"),
        55,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::AlreadySubmitted(_)));

    // The first submission and the score both stand
    let stored = db.get_submission(&phone, week_id).await.unwrap().unwrap();
    assert_eq!(stored.time_taken, 60);
    let user = db.get_user(&phone).await.unwrap().unwrap();
    assert_eq!(user.cumulative_score, Some(2));
}

#[tokio::test]
async fn test_unknown_user_rejected() {
    require_emulator!();

    let db = test_db().await;
    let leaderboard = LeaderboardService::new();
    let week_id = "2093-W22";
    seed_week(&db, week_id).await;

    let err = submit_answers(
        &db,
        &leaderboard,
        "+10000000000",
        week_id,
        answers(week_id, "Paris", "Mars"),
        30,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_weekly_leaderboard_reflects_submissions() {
    require_emulator!();

    let db = test_db().await;
    let leaderboard = LeaderboardService::new();
    let week_id = "2093-W23";
    seed_week(&db, week_id).await;

    let fast = unique_phone();
    let slow = unique_phone();
    db.upsert_user(&User::new("Fast".to_string(), fast.clone(), "2026-06-01T09:00:00Z".to_string()))
        .await
        .unwrap();
    db.upsert_user(&User::new("Slow".to_string(), slow.clone(), "2026-06-01T09:01:00Z".to_string()))
        .await
        .unwrap();

    submit_answers(&db, &leaderboard, &fast, week_id, answers(week_id, "Paris", "Mars"), 40)
        .await
        .unwrap();
    submit_answers(&db, &leaderboard, &slow, week_id, answers(week_id, "Paris", "Mars"), 90)
        .await
        .unwrap();

    let entries = leaderboard.get_weekly(&db, week_id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Fast");
    assert_eq!(entries[0].rank, 1);
    assert_eq!(entries[1].name, "Slow");
    assert_eq!(entries[1].rank, 2);

    // Activation freezes the ranking as a snapshot
    let rankings = leaderboard.activate(&db, week_id).await.unwrap();
    assert_eq!(rankings.len(), 2);
    let snapshot = db.get_snapshot(week_id).await.unwrap().unwrap();
    assert_eq!(snapshot.rankings[0].name, "Fast");
}
