pub mod appointments;
pub mod auth;
pub mod chat;
pub mod exercises;
pub mod middleware;
pub mod mood;
pub mod questionnaires;
pub mod rest;
pub mod state;

pub use middleware::require_auth;
pub use rest::health_handler;

use axum::http::StatusCode;
use serenica_core::ports::PortError;

/// Maps a port error to the HTTP response the handlers return.
pub(crate) fn status_for(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        PortError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authorized".to_string()),
        PortError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        PortError::Unexpected(msg) => {
            tracing::error!("Unexpected port error: {}", msg);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
        }
    }
}
