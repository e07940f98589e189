//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, ollama::OllamaChatAdapter},
    config::Config,
    error::ApiError,
    web::{
        appointments, chat, exercises, mood, questionnaires,
        auth::{
            change_password_handler, login_handler, logout_handler, me_handler, signup_handler,
            update_profile_handler,
        },
        health_handler,
        middleware::require_auth,
        rest::ApiDoc,
        state::AppState,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use serenica_core::ports::ChatService;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let chat_adapter = Arc::new(OllamaChatAdapter::new(
        config.ollama_base_url.clone(),
        config.chat_model.clone(),
    ));
    match chat_adapter.model_ready().await {
        Ok(true) => info!("Chat model '{}' is available", config.chat_model),
        Ok(false) => warn!(
            "Chat model '{}' is not pulled yet; chat will return 503 until `ollama pull {}` is run",
            config.chat_model, config.chat_model
        ),
        Err(e) => warn!("Ollama is not reachable at startup: {:?}", e),
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        config: config.clone(),
        chat_adapter,
        mood_detectors: Arc::new(Mutex::new(HashMap::new())),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|_| ApiError::Internal(format!("Invalid CORS origin: '{}'", config.cors_origin)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(me_handler))
        .route("/auth/profile", put(update_profile_handler))
        .route("/auth/password", put(change_password_handler))
        .route(
            "/appointments",
            post(appointments::book_appointment_handler).get(appointments::list_appointments_handler),
        )
        .route(
            "/appointments/{id}",
            get(appointments::get_appointment_handler)
                .delete(appointments::cancel_appointment_handler),
        )
        .route("/questionnaires", get(questionnaires::list_questionnaires_handler))
        .route("/questionnaires/responses", get(questionnaires::list_responses_handler))
        .route(
            "/questionnaires/responses/{id}",
            get(questionnaires::get_response_handler)
                .delete(questionnaires::delete_response_handler),
        )
        .route("/questionnaires/{id}", get(questionnaires::get_questionnaire_handler))
        .route("/questionnaires/{id}/responses", post(questionnaires::submit_answers_handler))
        .route("/exercises", get(exercises::list_exercises_handler))
        .route("/exercises/daily", get(exercises::daily_exercise_handler))
        .route("/exercises/sessions", get(exercises::list_sessions_handler))
        .route("/exercises/progress", get(exercises::progress_summary_handler))
        .route("/exercises/recommendations", get(exercises::recommendations_handler))
        .route("/exercises/{id}", get(exercises::get_exercise_handler))
        .route("/exercises/{id}/content", get(exercises::exercise_content_handler))
        .route("/exercises/{id}/sessions", post(exercises::complete_session_handler))
        .route("/chat/status", get(chat::chat_status_handler))
        .route("/chat/{bot}", post(chat::chat_handler))
        .route("/mood/event", post(mood::detector_event_handler))
        .route("/mood/frame", post(mood::detector_frame_handler))
        .route("/mood/state", get(mood::detector_state_handler))
        .route("/mood/reset", post(mood::detector_reset_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
