//! services/api/src/web/chat.rs
//!
//! Endpoints for the AI support chatbots. Replies stream back as a chunked
//! plain-text body, token by token, as the local LLM generates them.
//!
//! Transcripts are ephemeral: the client sends the full conversation with
//! every request and nothing is persisted server-side.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serenica_core::domain::{ChatMessage, ChatbotKind};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;
use crate::web::status_for;

//=========================================================================================
// System Prompts
//=========================================================================================

const CBT_PROMPT: &str = "You are a supportive Cognitive Behavioral Therapy assistant. \
Help the user identify negative automatic thoughts, examine the evidence for and against them, \
and develop more balanced alternatives. Ask gentle, open questions. Be warm and concise. \
You are not a replacement for a licensed therapist; encourage professional help for serious concerns.";

const MINDFULNESS_PROMPT: &str = "You are a calming mindfulness guide. \
Help the user stay grounded in the present moment with breathing exercises, body scans, \
and acceptance-based reflections. Speak slowly and simply, one step at a time. \
You are not a replacement for a licensed therapist; encourage professional help for serious concerns.";

const CAREER_COACH_PROMPT: &str = "You are an encouraging career coach. \
Help the user clarify goals, recognize strengths, and plan concrete next steps in their \
work and personal growth. Be positive, practical, and specific. \
You are not a replacement for a licensed therapist; encourage professional help for serious concerns.";

fn system_prompt(bot: ChatbotKind) -> &'static str {
    match bot {
        ChatbotKind::Cbt => CBT_PROMPT,
        ChatbotKind::Mindfulness => MINDFULNESS_PROMPT,
        ChatbotKind::CareerCoach => CAREER_COACH_PROMPT,
    }
}

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ChatTurn {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    /// The transcript so far, oldest first, ending with the user's new message.
    pub messages: Vec<ChatTurn>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatStatusResponse {
    pub ready: bool,
    pub model: String,
    pub available_models: Vec<String>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /chat/status - Whether the configured chat model is ready
#[utoipa::path(
    get,
    path = "/chat/status",
    responses(
        (status = 200, description = "Backend and model availability", body = ChatStatusResponse),
        (status = 503, description = "LLM backend unreachable"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn chat_status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChatStatusResponse>, (StatusCode, String)> {
    let available_models = state.chat_adapter.list_models().await.map_err(status_for)?;
    let model = state.config.chat_model.clone();
    let ready = available_models.iter().any(|m| m == &model);
    Ok(Json(ChatStatusResponse { ready, model, available_models }))
}

/// POST /chat/{bot} - Stream a chatbot reply
///
/// `bot` is one of "cbt", "mindfulness", or "career". The response body is
/// the generated reply streamed as plain text chunks.
#[utoipa::path(
    post,
    path = "/chat/{bot}",
    params(("bot" = String, Path, description = "Chatbot: cbt, mindfulness, or career")),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Streamed reply text"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown chatbot"),
        (status = 503, description = "LLM backend unreachable"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(bot): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    let bot = ChatbotKind::parse(&bot)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown chatbot '{}'", bot)))?;

    // The transcript must end with a non-empty user message.
    let last = req.messages.last().ok_or((
        StatusCode::BAD_REQUEST,
        "The transcript must contain at least one message".to_string(),
    ))?;
    if last.role != "user" || last.content.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "The transcript must end with a non-empty user message".to_string(),
        ));
    }

    // Ground the system prompt in the user's most recent questionnaire
    // result, when one exists.
    let mut system = system_prompt(bot).to_string();
    match state.db.latest_questionnaire_response(user_id).await {
        Ok(Some(latest)) => {
            system.push_str(&format!(
                "\n\nContext about this user's most recent self-assessment ({}): {}. \
                 Let this inform your tone, but do not quote scores back unless asked.",
                latest.taken_at.format("%Y-%m-%d"),
                latest.outcome.summary(&latest.title)
            ));
        }
        Ok(None) => {}
        Err(e) => {
            // Chat still works without the augmentation.
            error!("Failed to load latest questionnaire response: {:?}", e);
        }
    }

    let mut messages = Vec::with_capacity(req.messages.len() + 1);
    messages.push(ChatMessage::system(system));
    for turn in &req.messages {
        match turn.role.as_str() {
            "user" => messages.push(ChatMessage::user(turn.content.clone())),
            "assistant" => messages.push(ChatMessage::assistant(turn.content.clone())),
            other => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    format!("Unknown message role '{}'", other),
                ))
            }
        }
    }

    info!(bot = bot.as_str(), turns = req.messages.len(), "Starting chat generation");

    let tokens = state
        .chat_adapter
        .stream_chat(&messages)
        .await
        .map_err(status_for)?;

    // Mid-stream failures can no longer change the status code, so they are
    // logged and the body simply ends.
    let body_stream = tokens.filter_map(|item| async move {
        match item {
            Ok(token) => Some(Ok::<_, std::convert::Infallible>(token)),
            Err(e) => {
                error!("Chat stream ended with error: {:?}", e);
                None
            }
        }
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body_stream),
    )
        .into_response())
}
