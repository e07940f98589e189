//! services/api/src/web/questionnaires.rs
//!
//! Endpoints for listing questionnaires, submitting answers for scoring,
//! and reviewing past results. Scoring itself is pure and lives in the
//! core crate; these handlers validate, persist, and shape responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serenica_core::domain::NewQuestionnaireResponse;
use serenica_core::questionnaires::{self, AnswerValue, ValidationError};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::status_for;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct QuestionnaireSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_minutes: u32,
    pub question_count: usize,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitAnswersRequest {
    /// Answers keyed by question id.
    #[schema(value_type = Object)]
    pub answers: BTreeMap<String, AnswerValue>,
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub response_id: Uuid,
    #[schema(value_type = Object)]
    pub outcome: serde_json::Value,
    #[schema(value_type = Object)]
    pub chatbot_recommendation: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseSummary {
    pub id: Uuid,
    pub questionnaire_id: String,
    pub title: String,
    #[schema(value_type = Object)]
    pub outcome: serde_json::Value,
    pub taken_at: DateTime<Utc>,
}

fn to_json<T: Serialize>(value: &T) -> Result<serde_json::Value, (StatusCode, String)> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("Failed to serialize payload: {}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    })
}

fn validation_status(e: ValidationError) -> (StatusCode, String) {
    match e {
        ValidationError::UnknownQuestionnaire(_) => (StatusCode::NOT_FOUND, e.to_string()),
        _ => (StatusCode::BAD_REQUEST, e.to_string()),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /questionnaires - All available questionnaires
#[utoipa::path(
    get,
    path = "/questionnaires",
    responses(
        (status = 200, description = "Available questionnaires", body = [QuestionnaireSummary]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_questionnaires_handler() -> Json<Vec<QuestionnaireSummary>> {
    let summaries = questionnaires::all()
        .into_iter()
        .map(|q| QuestionnaireSummary {
            id: q.id.clone(),
            title: q.title.clone(),
            description: q.description.clone(),
            category: q.category.clone(),
            duration_minutes: q.duration_minutes,
            question_count: q.questions.len(),
        })
        .collect();
    Json(summaries)
}

/// GET /questionnaires/{id} - One questionnaire with its full question bank
#[utoipa::path(
    get,
    path = "/questionnaires/{id}",
    params(("id" = String, Path, description = "Questionnaire id")),
    responses(
        (status = 200, description = "The questionnaire"),
        (status = 404, description = "Unknown questionnaire"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_questionnaire_handler(
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let questionnaire = questionnaires::by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown questionnaire '{}'", id)))?;
    Ok(Json(to_json(&questionnaire)?))
}

/// POST /questionnaires/{id}/responses - Submit answers for scoring
#[utoipa::path(
    post,
    path = "/questionnaires/{id}/responses",
    params(("id" = String, Path, description = "Questionnaire id")),
    request_body = SubmitAnswersRequest,
    responses(
        (status = 201, description = "Answers scored and stored", body = SubmissionResponse),
        (status = 400, description = "Answers failed validation"),
        (status = 404, description = "Unknown questionnaire"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn submit_answers_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<String>,
    Json(req): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let questionnaire = questionnaires::by_id(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown questionnaire '{}'", id)))?;

    let outcome = questionnaires::score(&id, &req.answers).map_err(validation_status)?;
    let recommendation = questionnaires::chatbot_recommendation(&id, &outcome);

    let stored = state
        .db
        .create_questionnaire_response(NewQuestionnaireResponse {
            user_id,
            questionnaire_id: id,
            title: questionnaire.title,
            answers: req.answers,
            outcome: outcome.clone(),
        })
        .await
        .map_err(status_for)?;

    let response = SubmissionResponse {
        response_id: stored.id,
        outcome: to_json(&outcome)?,
        chatbot_recommendation: to_json(&recommendation)?,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /questionnaires/responses - The user's past results, newest first
#[utoipa::path(
    get,
    path = "/questionnaires/responses",
    responses(
        (status = 200, description = "Past questionnaire results", body = [ResponseSummary]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_responses_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<ResponseSummary>>, (StatusCode, String)> {
    let responses = state
        .db
        .list_questionnaire_responses(user_id)
        .await
        .map_err(status_for)?;
    let mut summaries = Vec::with_capacity(responses.len());
    for r in responses {
        summaries.push(ResponseSummary {
            id: r.id,
            questionnaire_id: r.questionnaire_id,
            title: r.title,
            outcome: to_json(&r.outcome)?,
            taken_at: r.taken_at,
        });
    }
    Ok(Json(summaries))
}

/// GET /questionnaires/responses/{id} - One past result with its answers
#[utoipa::path(
    get,
    path = "/questionnaires/responses/{id}",
    params(("id" = Uuid, Path, description = "Response id")),
    responses(
        (status = 200, description = "The stored response"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_response_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let response = state
        .db
        .get_questionnaire_response(user_id, id)
        .await
        .map_err(status_for)?;
    Ok(Json(to_json(&response)?))
}

/// DELETE /questionnaires/responses/{id} - Delete a stored result
#[utoipa::path(
    delete,
    path = "/questionnaires/responses/{id}",
    params(("id" = Uuid, Path, description = "Response id")),
    responses(
        (status = 204, description = "Response deleted"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn delete_response_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_questionnaire_response(user_id, id)
        .await
        .map_err(status_for)?;
    Ok(StatusCode::NO_CONTENT)
}
