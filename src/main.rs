// SPDX-License-Identifier: MIT

//! Weekly-Quiz API Server
//!
//! Serves registration, questions, submissions, and leaderboards for
//! the weekly trivia competition.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weekly_quiz::{
    config::Config, db::FirestoreDb, services::LeaderboardService, AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Weekly-Quiz API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Leaderboard cache lives for the process lifetime; snapshots and
    // all durable state stay in Firestore.
    let leaderboard = LeaderboardService::new();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        leaderboard,
    });

    // Build router
    let app = weekly_quiz::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("weekly_quiz=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
