//! services/api/src/web/mood.rs
//!
//! Endpoints driving the per-user mood detector. The client owns the
//! camera and the face model; it reports lifecycle events and classified
//! frames here, and the server runs the state machine. Detector state is
//! in-memory only and vanishes on restart.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serenica_core::mood::{DetectorPhase, ExpressionScores, FrameOutcome, MoodBucket, MoodSample};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DetectorEvent {
    Start,
    CameraGranted,
    CameraDenied,
    ModelsLoaded,
    Unsupported,
}

#[derive(Deserialize, ToSchema)]
pub struct DetectorEventRequest {
    pub event: DetectorEvent,
}

#[derive(Deserialize, ToSchema)]
pub struct FrameRequest {
    /// Per-expression confidences for the frame, or absent when no face
    /// was found.
    #[schema(value_type = Object)]
    pub scores: Option<ExpressionScores>,
}

#[derive(Serialize, ToSchema)]
pub struct DetectorStateResponse {
    #[schema(value_type = String)]
    pub phase: DetectorPhase,
    #[schema(value_type = Object)]
    pub current_mood: Option<MoodBucket>,
    #[schema(value_type = Object)]
    pub history: Vec<MoodSample>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /mood/event - Advance the detector lifecycle
#[utoipa::path(
    post,
    path = "/mood/event",
    request_body = DetectorEventRequest,
    responses(
        (status = 200, description = "Detector state after the event", body = DetectorStateResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn detector_event_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<DetectorEventRequest>,
) -> Json<DetectorStateResponse> {
    let mut detectors = state.mood_detectors.lock().await;
    let detector = detectors.entry(user_id).or_default();
    match req.event {
        DetectorEvent::Start => detector.start(),
        DetectorEvent::CameraGranted => detector.camera_granted(),
        DetectorEvent::CameraDenied => detector.camera_denied(),
        DetectorEvent::ModelsLoaded => detector.models_loaded(),
        DetectorEvent::Unsupported => detector.mark_unsupported(),
    }
    Json(DetectorStateResponse {
        phase: detector.phase(),
        current_mood: detector.current_mood(),
        history: detector.history().to_vec(),
    })
}

/// POST /mood/frame - Feed one classified frame through the detector
#[utoipa::path(
    post,
    path = "/mood/frame",
    request_body = FrameRequest,
    responses(
        (status = 200, description = "Outcome of the frame"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn detector_frame_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<FrameRequest>,
) -> Json<FrameOutcome> {
    let mut detectors = state.mood_detectors.lock().await;
    let detector = detectors.entry(user_id).or_default();
    let outcome = detector.observe(req.scores, Utc::now());
    Json(outcome)
}

/// GET /mood/state - The detector's current phase, mood, and history
#[utoipa::path(
    get,
    path = "/mood/state",
    responses(
        (status = 200, description = "Current detector state", body = DetectorStateResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn detector_state_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Json<DetectorStateResponse> {
    let mut detectors = state.mood_detectors.lock().await;
    let detector = detectors.entry(user_id).or_default();
    Json(DetectorStateResponse {
        phase: detector.phase(),
        current_mood: detector.current_mood(),
        history: detector.history().to_vec(),
    })
}

/// POST /mood/reset - Return the detector to idle and clear history
#[utoipa::path(
    post,
    path = "/mood/reset",
    responses(
        (status = 204, description = "Detector reset"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn detector_reset_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> StatusCode {
    let mut detectors = state.mood_detectors.lock().await;
    if let Some(detector) = detectors.get_mut(&user_id) {
        detector.reset();
    }
    StatusCode::NO_CONTENT
}
