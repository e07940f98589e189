//! crates/serenica_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database backend; serde derives
//! exist only so the same types can cross the wire unchanged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::questionnaires::{AnswerValue, ScoreOutcome};

/// Represents an authenticated account holder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub email_verified: bool,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// How a therapy appointment is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Virtual,
    InPerson,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Virtual => "virtual",
            SessionKind::InPerson => "in_person",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "virtual" => Some(SessionKind::Virtual),
            "in_person" => Some(SessionKind::InPerson),
            _ => None,
        }
    }
}

/// A booked therapy appointment. Created and deleted by its owner,
/// never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub therapist: String,
    pub session_kind: SessionKind,
    pub scheduled_on: NaiveDate,
    pub time_slot: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The fields a caller supplies when booking; ids and timestamps are
/// assigned by the storage layer.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub user_id: Uuid,
    pub therapist: String,
    pub session_kind: SessionKind,
    pub scheduled_on: NaiveDate,
    pub time_slot: String,
    pub notes: Option<String>,
}

/// A completed questionnaire: the raw answers plus the computed outcome.
/// Created on submit, readable and deletable by the owner, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionnaireResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub questionnaire_id: String,
    pub title: String,
    pub answers: BTreeMap<String, AnswerValue>,
    pub outcome: ScoreOutcome,
    pub taken_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuestionnaireResponse {
    pub user_id: Uuid,
    pub questionnaire_id: String,
    pub title: String,
    pub answers: BTreeMap<String, AnswerValue>,
    pub outcome: ScoreOutcome,
}

/// A finished brain-training round. Created on completion, read for
/// progress dashboards, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_id: String,
    pub category: crate::neurobic::ExerciseCategory,
    pub difficulty: crate::neurobic::Difficulty,
    pub performance: crate::neurobic::Performance,
    pub score: u8,
    pub elapsed_seconds: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExerciseSession {
    pub user_id: Uuid,
    pub exercise_id: String,
    pub category: crate::neurobic::ExerciseCategory,
    pub difficulty: crate::neurobic::Difficulty,
    pub performance: crate::neurobic::Performance,
    pub score: u8,
    pub elapsed_seconds: u32,
}

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn of an in-memory chat transcript. Transcripts are ephemeral:
/// they exist only for the duration of one chat screen visit and are
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// The AI companions a user can be routed to. Questionnaire outcomes and
/// mood detections both resolve to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatbotKind {
    Cbt,
    Mindfulness,
    CareerCoach,
}

impl ChatbotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatbotKind::Cbt => "cbt",
            ChatbotKind::Mindfulness => "mindfulness",
            ChatbotKind::CareerCoach => "career",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cbt" => Some(ChatbotKind::Cbt),
            "mindfulness" => Some(ChatbotKind::Mindfulness),
            "career" => Some(ChatbotKind::CareerCoach),
            _ => None,
        }
    }
}
