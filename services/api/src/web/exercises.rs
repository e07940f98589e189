//! services/api/src/web/exercises.rs
//!
//! Endpoints for the neurobic exercise library: browsing the catalog,
//! generating round content, recording completed sessions, and progress
//! heuristics.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serenica_core::domain::NewExerciseSession;
use serenica_core::neurobic::{
    self, Difficulty, ExerciseCategory, ExerciseSettings, Performance, ProgressEntry,
};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::status_for;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ExerciseFilter {
    /// Restrict to one category.
    pub category: Option<String>,
    /// Restrict to one difficulty level.
    pub difficulty: Option<String>,
    /// Only exercises that fit in this many minutes.
    pub max_duration: Option<u32>,
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteSessionRequest {
    #[schema(value_type = Object)]
    pub performance: Performance,
    pub elapsed_seconds: u32,
}

#[derive(Serialize, ToSchema)]
pub struct CompletedSessionResponse {
    pub session_id: Uuid,
    pub score: u8,
    pub feedback: String,
    #[schema(value_type = Object)]
    pub difficulty_suggestion: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
pub struct ProgressSummaryResponse {
    pub total_sessions: usize,
    #[schema(value_type = Object)]
    pub category_averages: serde_json::Value,
    #[schema(value_type = Object)]
    pub difficulty_suggestion: serde_json::Value,
    #[schema(value_type = Object)]
    pub recommendations: serde_json::Value,
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, (StatusCode, String)> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("Failed to serialize payload: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    })
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /exercises - The exercise catalog, optionally filtered
#[utoipa::path(
    get,
    path = "/exercises",
    params(ExerciseFilter),
    responses(
        (status = 200, description = "Exercises matching the filters"),
        (status = 400, description = "Unknown category or difficulty"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_exercises_handler(
    Query(filter): Query<ExerciseFilter>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let category = filter
        .category
        .as_deref()
        .map(|s| {
            ExerciseCategory::parse(s)
                .ok_or((StatusCode::BAD_REQUEST, format!("Unknown category '{}'", s)))
        })
        .transpose()?;
    let difficulty = filter
        .difficulty
        .as_deref()
        .map(|s| {
            Difficulty::parse(s)
                .ok_or((StatusCode::BAD_REQUEST, format!("Unknown difficulty '{}'", s)))
        })
        .transpose()?;

    let exercises: Vec<_> = neurobic::catalog()
        .into_iter()
        .filter(|e| category.map_or(true, |c| e.category == c))
        .filter(|e| difficulty.map_or(true, |d| e.difficulty == d))
        .filter(|e| filter.max_duration.map_or(true, |m| e.duration_minutes <= m))
        .collect();
    Ok(Json(to_json(&exercises)?))
}

/// GET /exercises/daily - Today's exercise
#[utoipa::path(
    get,
    path = "/exercises/daily",
    responses(
        (status = 200, description = "The exercise of the day"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn daily_exercise_handler() -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let exercise = neurobic::daily_exercise(Utc::now().date_naive());
    Ok(Json(to_json(&exercise)?))
}

/// GET /exercises/{id} - One exercise's metadata
#[utoipa::path(
    get,
    path = "/exercises/{id}",
    params(("id" = String, Path, description = "Exercise id")),
    responses(
        (status = 200, description = "The exercise"),
        (status = 404, description = "Unknown exercise"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_exercise_handler(
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let exercise = neurobic::by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown exercise '{}'", id)))?;
    Ok(Json(to_json(&exercise)?))
}

/// GET /exercises/{id}/content - Freshly generated round content
///
/// Interactive exercises get randomized content (sequences, decks, grids);
/// quiz exercises get their static banks; the rest get their instructions.
#[utoipa::path(
    get,
    path = "/exercises/{id}/content",
    params(("id" = String, Path, description = "Exercise id")),
    responses(
        (status = 200, description = "Round content for the exercise"),
        (status = 404, description = "Unknown exercise"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn exercise_content_handler(
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let exercise = neurobic::by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown exercise '{}'", id)))?;
    let mut rng = rand::thread_rng();

    let content = match (exercise.id, &exercise.settings) {
        ("memory_sequence", Some(ExerciseSettings::Sequence { initial_length, .. })) => {
            json!({ "sequence": neurobic::generate_number_sequence(&mut rng, *initial_length) })
        }
        ("rhythm_pattern", Some(ExerciseSettings::Sequence { initial_length, .. })) => {
            json!({ "beats": neurobic::generate_rhythm_pattern(&mut rng, *initial_length) })
        }
        ("memory_pairs", Some(ExerciseSettings::Pairs { card_types, .. })) => {
            json!({ "cards": neurobic::generate_memory_pairs(&mut rng, *card_types) })
        }
        ("spatial_memory", Some(ExerciseSettings::Grid { grid_size, items_to_remember, .. })) => {
            json!({
                "grid_size": grid_size,
                "positions": neurobic::generate_spatial_pattern(&mut rng, *grid_size, *items_to_remember),
            })
        }
        ("stroop_test", Some(ExerciseSettings::Timed { rounds, .. })) => {
            let items: Vec<_> = (0..*rounds)
                .map(|_| neurobic::generate_stroop_item(&mut rng))
                .collect();
            json!({ "items": items })
        }
        ("visual_search", Some(ExerciseSettings::Search { item_count, target_count, .. })) => {
            json!({ "grid": neurobic::generate_visual_search_grid(&mut rng, *item_count, *target_count) })
        }
        ("story_builder", _) => json!({ "prompts": neurobic::generate_story_prompts(&mut rng) }),
        ("pattern_completion", _) => json!({ "puzzles": neurobic::pattern_puzzles() }),
        ("riddle_solver", _) => json!({ "riddles": neurobic::logic_riddles() }),
        ("alternative_uses", _) => json!({ "objects": neurobic::alternative_uses_objects() }),
        _ => json!({ "instructions": exercise.instructions }),
    };
    Ok(Json(json!({ "exercise_id": exercise.id, "content": content })))
}

/// POST /exercises/{id}/sessions - Record a completed round
#[utoipa::path(
    post,
    path = "/exercises/{id}/sessions",
    params(("id" = String, Path, description = "Exercise id")),
    request_body = CompleteSessionRequest,
    responses(
        (status = 201, description = "Session scored and stored", body = CompletedSessionResponse),
        (status = 404, description = "Unknown exercise"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn complete_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
    Json(req): Json<CompleteSessionRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let exercise = neurobic::by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown exercise '{}'", id)))?;

    let result = neurobic::calculate_score(&id, &req.performance);

    let stored = state
        .db
        .create_exercise_session(NewExerciseSession {
            user_id,
            exercise_id: id.clone(),
            category: exercise.category,
            difficulty: exercise.difficulty,
            performance: req.performance,
            score: result.score,
            elapsed_seconds: req.elapsed_seconds,
        })
        .await
        .map_err(status_for)?;

    // Difficulty suggestions only consider this exercise's own history.
    let history = state
        .db
        .list_exercise_sessions(user_id)
        .await
        .map_err(status_for)?;
    let recent_scores: Vec<u8> = history
        .iter()
        .filter(|s| s.exercise_id == id)
        .map(|s| s.score)
        .collect();
    let suggestion = neurobic::suggest_difficulty(&recent_scores);

    let response = CompletedSessionResponse {
        session_id: stored.id,
        score: result.score,
        feedback: result.feedback,
        difficulty_suggestion: to_json(&suggestion)?,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /exercises/sessions - The user's completed rounds
#[utoipa::path(
    get,
    path = "/exercises/sessions",
    responses(
        (status = 200, description = "Completed exercise sessions"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_sessions_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let sessions = state
        .db
        .list_exercise_sessions(user_id)
        .await
        .map_err(status_for)?;
    Ok(Json(to_json(&sessions)?))
}

/// GET /exercises/progress - Progress summary across all completed rounds
#[utoipa::path(
    get,
    path = "/exercises/progress",
    responses(
        (status = 200, description = "Per-category averages, difficulty suggestion, and recommendations", body = ProgressSummaryResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn progress_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<ProgressSummaryResponse>, (StatusCode, String)> {
    let sessions = state
        .db
        .list_exercise_sessions(user_id)
        .await
        .map_err(status_for)?;

    // Sessions arrive oldest first, so the tail is the most recent play.
    let scores: Vec<u8> = sessions.iter().map(|s| s.score).collect();
    let suggestion = neurobic::suggest_difficulty(&scores);

    let progress: Vec<ProgressEntry> = sessions
        .iter()
        .map(|s| ProgressEntry { exercise_id: s.exercise_id.clone(), score: s.score })
        .collect();

    Ok(Json(ProgressSummaryResponse {
        total_sessions: sessions.len(),
        category_averages: to_json(&neurobic::category_averages(&progress))?,
        difficulty_suggestion: to_json(&suggestion)?,
        recommendations: to_json(&neurobic::personalized_recommendations(&progress))?,
    }))
}

/// GET /exercises/recommendations - Personalized exercise suggestions
#[utoipa::path(
    get,
    path = "/exercises/recommendations",
    responses(
        (status = 200, description = "Recommended exercises based on history"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn recommendations_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let sessions = state
        .db
        .list_exercise_sessions(user_id)
        .await
        .map_err(status_for)?;
    let progress: Vec<ProgressEntry> = sessions
        .into_iter()
        .map(|s| ProgressEntry { exercise_id: s.exercise_id, score: s.score })
        .collect();
    let recommendations = neurobic::personalized_recommendations(&progress);
    Ok(Json(to_json(&recommendations)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rhythm_rounds_get_generated_beats() {
        let Json(value) = exercise_content_handler(Path("rhythm_pattern".to_string()))
            .await
            .unwrap();
        let beats = value["content"]["beats"].as_array().unwrap();
        // The catalog configures six-beat rhythm rounds.
        assert_eq!(beats.len(), 6);
        assert_eq!(beats[0], serde_json::Value::Bool(true));
    }

    #[tokio::test]
    async fn interactive_rounds_without_generators_fall_back_to_instructions() {
        let Json(value) = exercise_content_handler(Path("mindfulness_breathing".to_string()))
            .await
            .unwrap();
        assert!(value["content"]["instructions"].is_string());
    }
}
