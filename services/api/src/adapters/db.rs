//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serenica_core::domain::{
    Appointment, ExerciseSession, NewAppointment, NewExerciseSession, NewQuestionnaireResponse,
    QuestionnaireResponse, SessionKind, User, UserCredentials,
};
use serenica_core::neurobic::{Difficulty, ExerciseCategory, Performance};
use serenica_core::ports::{DatabaseService, PortError, PortResult};
use serenica_core::questionnaires::{AnswerValue, ScoreOutcome};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    display_name: String,
    email_verified: bool,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            email_verified: self.email_verified,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AppointmentRecord {
    id: Uuid,
    user_id: Uuid,
    therapist: String,
    session_kind: String,
    scheduled_on: NaiveDate,
    time_slot: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}
impl AppointmentRecord {
    fn to_domain(self) -> PortResult<Appointment> {
        let session_kind = SessionKind::parse(&self.session_kind).ok_or_else(|| {
            PortError::Unexpected(format!("unknown session kind '{}'", self.session_kind))
        })?;
        Ok(Appointment {
            id: self.id,
            user_id: self.user_id,
            therapist: self.therapist,
            session_kind,
            scheduled_on: self.scheduled_on,
            time_slot: self.time_slot,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct QuestionnaireResponseRecord {
    id: Uuid,
    user_id: Uuid,
    questionnaire_id: String,
    title: String,
    answers: Json<BTreeMap<String, AnswerValue>>,
    outcome: Json<ScoreOutcome>,
    taken_at: DateTime<Utc>,
}
impl QuestionnaireResponseRecord {
    fn to_domain(self) -> QuestionnaireResponse {
        QuestionnaireResponse {
            id: self.id,
            user_id: self.user_id,
            questionnaire_id: self.questionnaire_id,
            title: self.title,
            answers: self.answers.0,
            outcome: self.outcome.0,
            taken_at: self.taken_at,
        }
    }
}

#[derive(FromRow)]
struct ExerciseSessionRecord {
    id: Uuid,
    user_id: Uuid,
    exercise_id: String,
    category: String,
    difficulty: String,
    performance: Json<Performance>,
    score: i16,
    elapsed_seconds: i32,
    completed_at: DateTime<Utc>,
}
impl ExerciseSessionRecord {
    fn to_domain(self) -> PortResult<ExerciseSession> {
        let category = ExerciseCategory::parse(&self.category).ok_or_else(|| {
            PortError::Unexpected(format!("unknown exercise category '{}'", self.category))
        })?;
        let difficulty = Difficulty::parse(&self.difficulty).ok_or_else(|| {
            PortError::Unexpected(format!("unknown difficulty '{}'", self.difficulty))
        })?;
        Ok(ExerciseSession {
            id: self.id,
            user_id: self.user_id,
            exercise_id: self.exercise_id,
            category,
            difficulty,
            performance: self.performance.0,
            score: self.score as u8,
            elapsed_seconds: self.elapsed_seconds as u32,
            completed_at: self.completed_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
        display_name: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, email, hashed_password, display_name)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, display_name, email_verified",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PortError::Unexpected(format!("email {} is already registered", email))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, display_name, email_verified FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, || format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, || format!("No account for {}", email)))?;
        Ok(record.to_domain())
    }

    async fn update_display_name(&self, user_id: Uuid, display_name: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "UPDATE users SET display_name = $1 WHERE id = $2
             RETURNING id, email, display_name, email_verified",
        )
        .bind(display_name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, || format!("User {} not found", user_id)))?;
        Ok(record.to_domain())
    }

    async fn update_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()> {
        sqlx::query("UPDATE users SET hashed_password = $1 WHERE id = $2")
            .bind(hashed_password)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        row.map(|(user_id,)| user_id).ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_appointment(&self, booking: NewAppointment) -> PortResult<Appointment> {
        let record = sqlx::query_as::<_, AppointmentRecord>(
            "INSERT INTO appointments (id, user_id, therapist, session_kind, scheduled_on, time_slot, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id, user_id, therapist, session_kind, scheduled_on, time_slot, notes, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(booking.user_id)
        .bind(&booking.therapist)
        .bind(booking.session_kind.as_str())
        .bind(booking.scheduled_on)
        .bind(&booking.time_slot)
        .bind(&booking.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_appointments(&self, user_id: Uuid) -> PortResult<Vec<Appointment>> {
        let records = sqlx::query_as::<_, AppointmentRecord>(
            "SELECT id, user_id, therapist, session_kind, scheduled_on, time_slot, notes, created_at
             FROM appointments WHERE user_id = $1
             ORDER BY scheduled_on ASC, time_slot ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_appointment(&self, user_id: Uuid, id: Uuid) -> PortResult<Appointment> {
        let record = sqlx::query_as::<_, AppointmentRecord>(
            "SELECT id, user_id, therapist, session_kind, scheduled_on, time_slot, notes, created_at
             FROM appointments WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, || format!("Appointment {} not found", id)))?;
        record.to_domain()
    }

    async fn delete_appointment(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Appointment {} not found", id)));
        }
        Ok(())
    }

    async fn create_questionnaire_response(
        &self,
        response: NewQuestionnaireResponse,
    ) -> PortResult<QuestionnaireResponse> {
        let record = sqlx::query_as::<_, QuestionnaireResponseRecord>(
            "INSERT INTO questionnaire_responses (id, user_id, questionnaire_id, title, answers, outcome)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, user_id, questionnaire_id, title, answers, outcome, taken_at",
        )
        .bind(Uuid::new_v4())
        .bind(response.user_id)
        .bind(&response.questionnaire_id)
        .bind(&response.title)
        .bind(Json(&response.answers))
        .bind(Json(&response.outcome))
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_questionnaire_responses(
        &self,
        user_id: Uuid,
    ) -> PortResult<Vec<QuestionnaireResponse>> {
        let records = sqlx::query_as::<_, QuestionnaireResponseRecord>(
            "SELECT id, user_id, questionnaire_id, title, answers, outcome, taken_at
             FROM questionnaire_responses WHERE user_id = $1
             ORDER BY taken_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_questionnaire_response(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> PortResult<QuestionnaireResponse> {
        let record = sqlx::query_as::<_, QuestionnaireResponseRecord>(
            "SELECT id, user_id, questionnaire_id, title, answers, outcome, taken_at
             FROM questionnaire_responses WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or(e, || format!("Questionnaire response {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn delete_questionnaire_response(&self, user_id: Uuid, id: Uuid) -> PortResult<()> {
        let result =
            sqlx::query("DELETE FROM questionnaire_responses WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Questionnaire response {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn latest_questionnaire_response(
        &self,
        user_id: Uuid,
    ) -> PortResult<Option<QuestionnaireResponse>> {
        let record = sqlx::query_as::<_, QuestionnaireResponseRecord>(
            "SELECT id, user_id, questionnaire_id, title, answers, outcome, taken_at
             FROM questionnaire_responses WHERE user_id = $1
             ORDER BY taken_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn create_exercise_session(
        &self,
        session: NewExerciseSession,
    ) -> PortResult<ExerciseSession> {
        let record = sqlx::query_as::<_, ExerciseSessionRecord>(
            "INSERT INTO exercise_sessions
                 (id, user_id, exercise_id, category, difficulty, performance, score, elapsed_seconds)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id, user_id, exercise_id, category, difficulty, performance, score,
                       elapsed_seconds, completed_at",
        )
        .bind(Uuid::new_v4())
        .bind(session.user_id)
        .bind(&session.exercise_id)
        .bind(session.category.as_str())
        .bind(session.difficulty.as_str())
        .bind(Json(&session.performance))
        .bind(session.score as i16)
        .bind(session.elapsed_seconds as i32)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_exercise_sessions(&self, user_id: Uuid) -> PortResult<Vec<ExerciseSession>> {
        let records = sqlx::query_as::<_, ExerciseSessionRecord>(
            "SELECT id, user_id, exercise_id, category, difficulty, performance, score,
                    elapsed_seconds, completed_at
             FROM exercise_sessions WHERE user_id = $1
             ORDER BY completed_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
