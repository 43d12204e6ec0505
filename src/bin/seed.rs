// SPDX-License-Identifier: MIT

//! Seed the database with default quiz settings and a starter question
//! set for the current week. Intended for local development against the
//! Firestore emulator.

use weekly_quiz::config::Config;
use weekly_quiz::db::FirestoreDb;
use weekly_quiz::models::{Question, QuizSettings};
use weekly_quiz::week;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let db = FirestoreDb::new(&config.gcp_project_id).await?;

    let week_id = week::current_week_id();
    println!("Seeding project {} for week {}", config.gcp_project_id, week_id);

    let settings = QuizSettings::default();
    db.set_settings(&settings).await?;
    println!(
        "  Settings: timer={}min quiz_active={}",
        settings.timer_duration_minutes, settings.quiz_active
    );

    let questions = sample_questions(&week_id);
    db.batch_upsert_questions(&questions).await?;
    println!("  {} questions written", questions.len());

    println!("Done.");
    Ok(())
}

fn sample_questions(week_id: &str) -> Vec<(String, Question)> {
    let spec: [(&str, [&str; 4], &str); 5] = [
        (
            "What is the capital of France?",
            ["London", "Berlin", "Paris", "Madrid"],
            "Paris",
        ),
        (
            "Which planet is known as the Red Planet?",
            ["Venus", "Mars", "Jupiter", "Saturn"],
            "Mars",
        ),
        (
            "What is the largest ocean on Earth?",
            ["Atlantic", "Indian", "Arctic", "Pacific"],
            "Pacific",
        ),
        (
            "Who wrote 'Romeo and Juliet'?",
            [
                "Charles Dickens",
                "William Shakespeare",
                "Jane Austen",
                "Mark Twain",
            ],
            "William Shakespeare",
        ),
        (
            "What is the chemical symbol for Gold?",
            ["Go", "Gd", "Au", "Ag"],
            "Au",
        ),
    ];

    spec.iter()
        .enumerate()
        .map(|(i, (text, options, answer))| {
            (
                format!("q{}", i + 1),
                Question {
                    id: None,
                    text: text.to_string(),
                    options: options.iter().map(|s| s.to_string()).collect(),
                    correct_answer: answer.to_string(),
                    order: i as i64 + 1,
                    week_id: Some(week_id.to_string()),
                },
            )
        })
        .collect()
}
