//! services/api/src/web/appointments.rs
//!
//! Endpoints for booking and managing therapy appointments. Appointments
//! are owned by the authenticated user; they can be created and cancelled
//! but never edited in place.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serenica_core::domain::{Appointment, NewAppointment, SessionKind};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::status_for;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct BookAppointmentRequest {
    pub therapist: String,
    /// Either "virtual" or "in_person".
    pub session_kind: String,
    pub scheduled_on: NaiveDate,
    pub time_slot: String,
    pub notes: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub therapist: String,
    pub session_kind: String,
    pub scheduled_on: NaiveDate,
    pub time_slot: String,
    pub notes: Option<String>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        Self {
            id: a.id,
            therapist: a.therapist,
            session_kind: a.session_kind.as_str().to_string(),
            scheduled_on: a.scheduled_on,
            time_slot: a.time_slot,
            notes: a.notes,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /appointments - Book a new appointment
#[utoipa::path(
    post,
    path = "/appointments",
    request_body = BookAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn book_appointment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let therapist = req.therapist.trim();
    if therapist.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "A therapist is required".to_string()));
    }
    if req.time_slot.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "A time slot is required".to_string()));
    }
    let session_kind = SessionKind::parse(&req.session_kind).ok_or((
        StatusCode::BAD_REQUEST,
        "session_kind must be 'virtual' or 'in_person'".to_string(),
    ))?;
    if req.scheduled_on < Utc::now().date_naive() {
        return Err((StatusCode::BAD_REQUEST, "Appointments cannot be booked in the past".to_string()));
    }

    let appointment = state
        .db
        .create_appointment(NewAppointment {
            user_id,
            therapist: therapist.to_string(),
            session_kind,
            scheduled_on: req.scheduled_on,
            time_slot: req.time_slot.trim().to_string(),
            notes: req.notes.filter(|n| !n.trim().is_empty()),
        })
        .await
        .map_err(status_for)?;

    Ok((StatusCode::CREATED, Json(AppointmentResponse::from(appointment))))
}

/// GET /appointments - List the user's appointments
#[utoipa::path(
    get,
    path = "/appointments",
    responses(
        (status = 200, description = "Appointments for the current user", body = [AppointmentResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_appointments_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<Vec<AppointmentResponse>>, (StatusCode, String)> {
    let appointments = state
        .db
        .list_appointments(user_id)
        .await
        .map_err(status_for)?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// GET /appointments/{id} - Fetch one appointment
#[utoipa::path(
    get,
    path = "/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "The appointment", body = AppointmentResponse),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_appointment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, (StatusCode, String)> {
    let appointment = state
        .db
        .get_appointment(user_id, id)
        .await
        .map_err(status_for)?;
    Ok(Json(appointment.into()))
}

/// DELETE /appointments/{id} - Cancel an appointment
#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    params(("id" = Uuid, Path, description = "Appointment id")),
    responses(
        (status = 204, description = "Appointment cancelled"),
        (status = 404, description = "Not found"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn cancel_appointment_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_appointment(user_id, id)
        .await
        .map_err(status_for)?;
    Ok(StatusCode::NO_CONTENT)
}
