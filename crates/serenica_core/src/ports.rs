//! crates/serenica_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

use crate::domain::{
    Appointment, ChatMessage, ExerciseSession, NewAppointment, NewExerciseSession,
    NewQuestionnaireResponse, QuestionnaireResponse, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    /// A backing service (database or LLM runtime) could not be reached.
    /// The message carries user-facing remediation guidance.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// An incremental stream of generated chat tokens.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, PortError>> + Send>>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User and Auth Management ---
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: &str,
    ) -> PortResult<User>;

    async fn get_user(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> PortResult<User>;

    async fn update_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Appointments ---
    async fn create_appointment(&self, booking: NewAppointment) -> PortResult<Appointment>;

    async fn list_appointments(&self, user_id: Uuid) -> PortResult<Vec<Appointment>>;

    async fn get_appointment(&self, user_id: Uuid, id: Uuid) -> PortResult<Appointment>;

    async fn delete_appointment(&self, user_id: Uuid, id: Uuid) -> PortResult<()>;

    // --- Questionnaire Responses ---
    async fn create_questionnaire_response(
        &self,
        response: NewQuestionnaireResponse,
    ) -> PortResult<QuestionnaireResponse>;

    async fn list_questionnaire_responses(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<QuestionnaireResponse>>;

    async fn get_questionnaire_response(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> PortResult<QuestionnaireResponse>;

    async fn delete_questionnaire_response(&self, user_id: Uuid, id: Uuid) -> PortResult<()>;

    /// The most recent response, if any. Used to ground the chat system prompt.
    async fn latest_questionnaire_response(
        &self,
        user_id: Uuid,
    ) -> PortResult<Option<QuestionnaireResponse>>;

    // --- Exercise Sessions ---
    async fn create_exercise_session(
        &self,
        session: NewExerciseSession,
    ) -> PortResult<ExerciseSession>;

    async fn list_exercise_sessions(&self, user_id: Uuid) -> PortResult<Vec<ExerciseSession>>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Streams the model's reply to a transcript, token by token.
    async fn stream_chat(&self, messages: &[ChatMessage]) -> PortResult<TokenStream>;

    /// Whether the configured chat model is present on the backend.
    async fn model_ready(&self) -> PortResult<bool>;

    /// Names of all models the backend currently serves.
    async fn list_models(&self) -> PortResult<Vec<String>>;
}
