// SPDX-License-Identifier: MIT

//! Admin routes: quiz settings (including leaderboard activation),
//! question CRUD, week listing, and AI-assisted question drafting.

use crate::error::{AppError, Result};
use crate::models::{Question, QuizSettings, Week};
use crate::services::{GeminiClient, GeneratedQuestion};
use crate::week;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/admin/config", post(update_config))
        .route("/api/admin/questions", post(add_question))
        .route("/api/admin/questions/generate", post(generate_questions))
        .route("/api/admin/questions/{id}", delete(delete_question))
        .route("/api/admin/questions-full", get(get_questions_full))
        .route("/api/admin/weeks", get(get_weeks))
}

fn validate_body<T: Validate>(body: &T) -> Result<()> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── Config / Leaderboard Activation ─────────────────────────

#[derive(Deserialize, Validate)]
pub struct AdminConfigRequest {
    #[validate(range(min = 1, max = 180))]
    pub timer_duration_minutes: i64,
    pub quiz_active: bool,
    #[serde(default)]
    pub leaderboard_active: bool,
}

#[derive(Serialize)]
pub struct AdminConfigResponse {
    pub status: String,
    pub quiz_active: bool,
    pub leaderboard_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_week_id: Option<String>,
}

/// Apply quiz settings.
///
/// Enabling the leaderboard is the activation event: the quiz closes,
/// the week's rankings are computed from live data and frozen as the
/// snapshot, and the week id is pinned into the settings document.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminConfigRequest>,
) -> Result<Json<AdminConfigResponse>> {
    validate_body(&body)?;

    let previous = state.db.get_settings().await?.unwrap_or_default();

    let mut settings = QuizSettings {
        timer_duration_minutes: body.timer_duration_minutes,
        quiz_active: body.quiz_active,
        leaderboard_active: body.leaderboard_active,
        // Keep the pin from the last activation until a new one happens
        current_week_id: previous.current_week_id,
    };

    if body.leaderboard_active {
        settings.quiz_active = false;

        let week_id = match state.db.resolve_active_week().await? {
            Some(week_id) => week_id,
            None => week::current_week_id(),
        };

        let rankings = state.leaderboard.activate(&state.db, &week_id).await?;
        settings.current_week_id = Some(week_id.clone());

        tracing::info!(
            week_id,
            entries = rankings.len(),
            "Leaderboard enabled: quiz closed, snapshot saved"
        );
    }

    state.db.set_settings(&settings).await?;

    Ok(Json(AdminConfigResponse {
        status: "updated".to_string(),
        quiz_active: settings.quiz_active,
        leaderboard_active: settings.leaderboard_active,
        current_week_id: settings.current_week_id,
    }))
}

// ─── Question CRUD ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct QuestionCreateRequest {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(length(min = 4, max = 4))]
    pub options: Vec<String>,
    #[validate(length(min = 1))]
    pub answer: String,
    #[validate(range(min = 0))]
    pub order: i64,
    /// Defaults to the active (or calendar) week
    pub week_id: Option<String>,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Create or replace a question.
async fn add_question(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QuestionCreateRequest>,
) -> Result<Json<StatusResponse>> {
    validate_body(&body)?;

    // The store can't enforce this contract; admin input is the gate.
    if !body.options.contains(&body.answer) {
        return Err(AppError::BadRequest(
            "answer must be one of the options".to_string(),
        ));
    }

    let week_id = match body.week_id {
        Some(week_id) if week::is_week_id(&week_id) => week_id,
        Some(week_id) => {
            return Err(AppError::BadRequest(format!(
                "Invalid week_id: {}",
                week_id
            )))
        }
        None => state
            .db
            .resolve_active_week()
            .await?
            .unwrap_or_else(week::current_week_id),
    };

    let question = Question {
        id: None,
        text: body.text,
        options: body.options,
        correct_answer: body.answer,
        order: body.order,
        week_id: Some(week_id),
    };
    state.db.upsert_question(&body.id, &question).await?;

    tracing::info!(id = %body.id, "Question created");
    Ok(Json(StatusResponse {
        status: "created".to_string(),
    }))
}

/// Delete a question.
async fn delete_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    state.db.delete_question(&id).await?;

    tracing::info!(id = %id, "Question deleted");
    Ok(Json(StatusResponse {
        status: "deleted".to_string(),
    }))
}

/// Question view including the correct answer.
#[derive(Serialize)]
pub struct FullQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_id: Option<String>,
}

/// All questions with correct answers, for the admin dashboard.
async fn get_questions_full(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FullQuestion>>> {
    let questions = state
        .db
        .list_questions()
        .await?
        .into_iter()
        .filter_map(|q| {
            q.id.map(|id| FullQuestion {
                id,
                text: q.text,
                options: q.options,
                correct_answer: q.correct_answer,
                order: q.order,
                week_id: q.week_id,
            })
        })
        .collect();

    Ok(Json(questions))
}

// ─── Weeks ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct WeeksResponse {
    /// Currently open week, if any
    pub active_week: Option<String>,
    /// Recent calendar week ids, newest first, for week pickers
    pub recent_weeks: Vec<String>,
    /// Explicit schedule records
    pub weeks: Vec<Week>,
    /// Questions per week id (covers weeks with no explicit record)
    pub question_counts: BTreeMap<String, usize>,
}

/// Week overview for the admin dashboard.
async fn get_weeks(State(state): State<Arc<AppState>>) -> Result<Json<WeeksResponse>> {
    let active_week = state.db.resolve_active_week().await?;
    let weeks = state.db.list_weeks().await?;

    let mut question_counts = BTreeMap::new();
    for question in state.db.list_questions().await? {
        if let Some(week_id) = question.week_id {
            *question_counts.entry(week_id).or_insert(0) += 1;
        }
    }

    Ok(Json(WeeksResponse {
        active_week,
        recent_weeks: week::recent_week_ids(8),
        weeks,
        question_counts,
    }))
}

// ─── AI Question Drafting ────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct GenerateRequest {
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_generate_count")]
    pub count: u32,
}

fn default_generate_count() -> u32 {
    20
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub questions: Vec<GeneratedQuestion>,
}

/// Generate question drafts with Gemini. Drafts are returned for
/// review, never written to the store directly.
async fn generate_questions(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>> {
    validate_body(&body)?;

    let api_key = state
        .config
        .gemini_api_key
        .clone()
        .ok_or_else(|| AppError::GeminiApi("GEMINI_API_KEY is not configured".to_string()))?;

    let client = GeminiClient::new(api_key, state.config.gemini_model.clone());
    let questions = client.generate_questions(body.count).await?;

    Ok(Json(GenerateResponse { questions }))
}
