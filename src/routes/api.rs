// SPDX-License-Identifier: MIT

//! Public API routes: registration, questions, submission, leaderboard,
//! and the public config view.

use crate::error::{AppError, Result};
use crate::models::{OverallEntry, PublicQuestion, WeeklyEntry};
use crate::services::submission::submit_answers;
use crate::time_utils::now_rfc3339;
use crate::week;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

/// Public routes (no authentication; phone number is the identity).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/questions", get(get_questions))
        .route("/api/submit", post(submit))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/config", get(get_config))
}

fn validate_body<T: Validate>(body: &T) -> Result<()> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── Registration ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 7, max = 15))]
    pub phone: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub has_submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_id: Option<String>,
    /// Present for returning users: whether they can still take this
    /// week's quiz
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resuming: Option<bool>,
}

/// Register a user, or welcome back an existing one.
///
/// Registration never fails for an existing phone number; the response
/// tells the frontend whether this week's quiz was already submitted.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>> {
    validate_body(&body)?;

    let active_week = state.db.resolve_active_week().await?;

    if let Some(user) = state.db.get_user(&body.phone).await? {
        let has_submitted = match &active_week {
            Some(week_id) => state
                .db
                .get_submission(&user.user_id, week_id)
                .await?
                .is_some(),
            None => false,
        };

        tracing::debug!(user_id = %user.user_id, has_submitted, "Returning user");
        return Ok(Json(RegisterResponse {
            user_id: user.user_id,
            has_submitted,
            week_id: active_week,
            resuming: Some(!has_submitted),
        }));
    }

    let user = crate::models::User::new(body.name, body.phone, now_rfc3339());
    state.db.upsert_user(&user).await?;

    tracing::info!(user_id = %user.user_id, "User registered");
    Ok(Json(RegisterResponse {
        user_id: user.user_id,
        has_submitted: false,
        week_id: active_week,
        resuming: None,
    }))
}

// ─── Questions ───────────────────────────────────────────────

#[derive(Deserialize)]
struct QuestionsQuery {
    week_id: Option<String>,
}

/// Questions for a week, in presentation order, correct answers stripped.
///
/// Defaults to the active week; when no quiz is open the list is empty.
async fn get_questions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuestionsQuery>,
) -> Result<Json<Vec<PublicQuestion>>> {
    let week_id = match params.week_id {
        Some(week_id) => {
            if !week::is_week_id(&week_id) {
                return Err(AppError::BadRequest(format!(
                    "Invalid week_id: {}",
                    week_id
                )));
            }
            Some(week_id)
        }
        None => state.db.resolve_active_week().await?,
    };

    let Some(week_id) = week_id else {
        return Ok(Json(vec![]));
    };

    let questions = state
        .db
        .questions_for_week(&week_id)
        .await?
        .into_iter()
        .filter_map(|q| {
            q.id.map(|id| PublicQuestion {
                id,
                text: q.text,
                options: q.options,
                order: q.order,
            })
        })
        .collect();

    Ok(Json(questions))
}

// ─── Submission ──────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SubmitRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    /// Defaults to the active week
    pub week_id: Option<String>,
    pub answers: HashMap<String, String>,
    #[validate(range(min = 0))]
    pub time_taken: i64,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub score: i64,
}

/// Score and record a submission. 404 for unknown users, 400 when a
/// submission already exists for this (user, week).
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    validate_body(&body)?;

    let week_id = match body.week_id {
        Some(week_id) => {
            if !week::is_week_id(&week_id) {
                return Err(AppError::BadRequest(format!(
                    "Invalid week_id: {}",
                    week_id
                )));
            }
            week_id
        }
        None => state
            .db
            .resolve_active_week()
            .await?
            .ok_or_else(|| AppError::BadRequest("No quiz is currently open".to_string()))?,
    };

    let score = submit_answers(
        &state.db,
        &state.leaderboard,
        &body.user_id,
        &week_id,
        body.answers,
        body.time_taken,
    )
    .await?;

    Ok(Json(SubmitResponse { score }))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Deserialize)]
struct LeaderboardQuery {
    /// "weekly" (default) or "overall"
    #[serde(rename = "type")]
    board_type: Option<String>,
    week_id: Option<String>,
}

/// Ranked entries; shape depends on the board type.
#[derive(Serialize)]
#[serde(untagged)]
enum LeaderboardResponse {
    Weekly(Vec<WeeklyEntry>),
    Overall(Vec<OverallEntry>),
}

/// Public leaderboard: weekly (snapshot-preferring) or overall.
async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>> {
    match params.board_type.as_deref().unwrap_or("weekly") {
        "overall" => {
            let entries = state.leaderboard.get_overall(&state.db).await?;
            Ok(Json(LeaderboardResponse::Overall(entries)))
        }
        "weekly" => {
            let week_id = match params.week_id {
                Some(week_id) if week::is_week_id(&week_id) => week_id,
                Some(week_id) => {
                    return Err(AppError::BadRequest(format!(
                        "Invalid week_id: {}",
                        week_id
                    )))
                }
                // The pinned week from the last activation wins over the
                // calendar week, so the board stays put after rollover
                // until the next quiz is opened.
                None => match state.db.get_settings().await?.and_then(|s| s.current_week_id) {
                    Some(pinned) => pinned,
                    None => week::current_week_id(),
                },
            };

            let entries = state.leaderboard.get_weekly(&state.db, &week_id).await?;
            Ok(Json(LeaderboardResponse::Weekly(entries)))
        }
        other => Err(AppError::BadRequest(format!(
            "Unknown leaderboard type: {}",
            other
        ))),
    }
}

// ─── Config ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PublicConfigResponse {
    pub timer_duration_minutes: i64,
    pub quiz_active: bool,
    pub leaderboard_active: bool,
}

/// Public quiz settings, with defaults when the document is unset.
async fn get_config(State(state): State<Arc<AppState>>) -> Result<Json<PublicConfigResponse>> {
    let settings = state.db.get_settings().await?.unwrap_or_default();

    Ok(Json(PublicConfigResponse {
        timer_duration_minutes: settings.timer_duration_minutes,
        quiz_active: settings.quiz_active,
        leaderboard_active: settings.leaderboard_active,
    }))
}
