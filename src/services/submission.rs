// SPDX-License-Identifier: MIT

//! Submission pipeline.
//!
//! Per (user, week) the state machine is NotSubmitted -> Submitted,
//! terminal. The guard is a presence check on the submission document,
//! not a compare-and-swap: two truly concurrent submissions for the same
//! (user, week) can both pass the check. Both would write the same
//! document key, so the worst case is last-write-wins on an equivalent
//! payload. Accepted weak consistency point.

use crate::db::FirestoreDb;
use crate::error::AppError;
use crate::models::Submission;
use crate::services::scoring::score_answers;
use crate::services::LeaderboardService;
use crate::time_utils::now_rfc3339;
use std::collections::HashMap;

/// Score and persist one user's answers for a week.
///
/// On success: submission stored under `users/{id}/submissions/{week}`,
/// cumulative score incremented atomically, legacy v1 fields mirrored
/// onto the user document, and the leaderboard cache cleared.
pub async fn submit_answers(
    db: &FirestoreDb,
    leaderboard: &LeaderboardService,
    user_id: &str,
    week_id: &str,
    answers: HashMap<String, String>,
    time_taken: i64,
) -> Result<i64, AppError> {
    let mut user = db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

    if db.get_submission(user_id, week_id).await?.is_some() {
        return Err(AppError::AlreadySubmitted(week_id.to_string()));
    }

    let correct: HashMap<String, String> = db
        .questions_for_week(week_id)
        .await?
        .into_iter()
        .filter_map(|q| q.id.clone().map(|id| (id, q.correct_answer)))
        .collect();

    let score = score_answers(&answers, &correct) as i64;
    let submitted_at = now_rfc3339();

    let submission = Submission {
        week_id: week_id.to_string(),
        user_name: user.name.clone(),
        score,
        answers: answers.clone(),
        time_taken,
        submitted_at: submitted_at.clone(),
        migrated: false,
        migrated_at: None,
        fixed_from: None,
    };
    db.set_submission(user_id, &submission).await?;

    db.increment_cumulative_score(user_id, score).await?;

    // Mirror the v1 flat fields so legacy readers keep working.
    user.score = Some(score);
    user.answers = Some(answers);
    user.submitted = Some(true);
    user.time_taken = Some(time_taken);
    user.week_id = Some(week_id.to_string());
    user.submitted_at = Some(submitted_at);
    db.update_user_fields(
        &user,
        vec![
            "score".to_string(),
            "answers".to_string(),
            "submitted".to_string(),
            "time_taken".to_string(),
            "week_id".to_string(),
            "submitted_at".to_string(),
        ],
    )
    .await?;

    leaderboard.invalidate_all();

    tracing::info!(user_id, week_id, score, "Submission recorded");
    Ok(score)
}
