//! services/api/src/web/rest.rs
//!
//! The health endpoint and the master definition for the OpenAPI
//! specification. Feature endpoints live in their own modules.

use axum::{http::StatusCode, response::Json};
use serde_json::json;
use utoipa::OpenApi;

use crate::web::{appointments, auth, chat, exercises, mood, questionnaires};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        auth::update_profile_handler,
        auth::change_password_handler,
        appointments::book_appointment_handler,
        appointments::list_appointments_handler,
        appointments::get_appointment_handler,
        appointments::cancel_appointment_handler,
        questionnaires::list_questionnaires_handler,
        questionnaires::get_questionnaire_handler,
        questionnaires::submit_answers_handler,
        questionnaires::list_responses_handler,
        questionnaires::get_response_handler,
        questionnaires::delete_response_handler,
        exercises::list_exercises_handler,
        exercises::daily_exercise_handler,
        exercises::get_exercise_handler,
        exercises::exercise_content_handler,
        exercises::complete_session_handler,
        exercises::list_sessions_handler,
        exercises::progress_summary_handler,
        exercises::recommendations_handler,
        chat::chat_status_handler,
        chat::chat_handler,
        mood::detector_event_handler,
        mood::detector_frame_handler,
        mood::detector_state_handler,
        mood::detector_reset_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::UpdateProfileRequest,
            auth::ChangePasswordRequest,
            appointments::BookAppointmentRequest,
            appointments::AppointmentResponse,
            questionnaires::QuestionnaireSummary,
            questionnaires::SubmitAnswersRequest,
            questionnaires::SubmissionResponse,
            questionnaires::ResponseSummary,
            exercises::CompleteSessionRequest,
            exercises::CompletedSessionResponse,
            exercises::ProgressSummaryResponse,
            chat::ChatTurn,
            chat::ChatRequest,
            chat::ChatStatusResponse,
            mood::DetectorEvent,
            mood::DetectorEventRequest,
            mood::FrameRequest,
            mood::DetectorStateResponse,
        )
    ),
    tags(
        (name = "Serenica API", description = "API endpoints for the mental wellness platform.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// GET /health - Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
pub async fn health_handler() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
