//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout, and profile
//! management.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serenica_core::ports::PortError;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

const SESSION_LIFETIME_DAYS: i64 = 30;
const MIN_PASSWORD_LENGTH: usize = 8;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub display_name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> Result<String, (StatusCode, String)> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password".to_string())
        })
}

fn verify_password(password: &str, hashed: &str) -> Result<bool, (StatusCode, String)> {
    let parsed_hash = PasswordHash::new(hashed).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Authentication error".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn validate_new_password(password: &str, confirm: &str) -> Result<(), (StatusCode, String)> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    if password != confirm {
        return Err((StatusCode::BAD_REQUEST, "Passwords do not match".to_string()));
    }
    Ok(())
}

fn session_cookie(auth_session_id: &str) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id,
        Duration::days(SESSION_LIFETIME_DAYS).num_seconds()
    )
}

async fn open_session(
    state: &AppState,
    user_id: Uuid,
) -> Result<String, (StatusCode, String)> {
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_LIFETIME_DAYS);
    state
        .db
        .create_auth_session(&auth_session_id, user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;
    Ok(auth_session_id)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Validate the submitted fields
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err((StatusCode::BAD_REQUEST, "A valid email is required".to_string()));
    }
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "A display name is required".to_string()));
    }
    validate_new_password(&req.password, &req.confirm_password)?;

    // 2. Hash the password
    let password_hash = hash_password(&req.password)?;

    // 3. Create user in database
    let user = state
        .db
        .create_user(&email, &password_hash, display_name)
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            (StatusCode::CONFLICT, "Could not create account with that email".to_string())
        })?;

    // 4. Open an auth session and set the cookie
    let auth_session_id = open_session(&state, user.id).await?;
    let cookie = session_cookie(&auth_session_id);

    let response = AuthResponse {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
    };

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let email = req.email.trim().to_lowercase();

    // 1. Get user by email. Lookup failures and bad passwords produce the
    //    same response so the endpoint does not leak which emails exist.
    let user_creds = state.db.get_user_by_email(&email).await.map_err(|e| {
        error!("Failed to get user: {:?}", e);
        (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
    })?;

    // 2. Verify password
    if !verify_password(&req.password, &user_creds.hashed_password)? {
        return Err((StatusCode::UNAUTHORIZED, "Invalid email or password".to_string()));
    }

    // 3. Open an auth session and set the cookie
    let auth_session_id = open_session(&state, user_creds.user_id).await?;
    let cookie = session_cookie(&auth_session_id);

    let user = state.db.get_user(user_creds.user_id).await.map_err(|e| {
        error!("Failed to load user profile: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile".to_string())
    })?;

    let response = AuthResponse {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: axum::http::HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Extract the session id from the cookie
    let auth_session_id = crate::web::middleware::session_cookie_value(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    // 2. Delete auth session from database
    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;

    // 3. Clear cookie
    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// GET /auth/me - The authenticated user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user profile", body = AuthResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let user = state.db.get_user(user_id).await.map_err(|e| {
        error!("Failed to load user profile: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile".to_string())
    })?;
    Ok(Json(AuthResponse {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
    }))
}

/// PUT /auth/profile - Update the display name
#[utoipa::path(
    put,
    path = "/auth/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "A display name is required".to_string()));
    }
    let user = state
        .db
        .update_display_name(user_id, display_name)
        .await
        .map_err(|e| {
            error!("Failed to update profile: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update profile".to_string())
        })?;
    Ok(Json(AuthResponse {
        user_id: user.id,
        email: user.email,
        display_name: user.display_name,
    }))
}

/// PUT /auth/password - Change the account password
#[utoipa::path(
    put,
    path = "/auth/password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Current password is wrong")
    )
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    validate_new_password(&req.new_password, &req.confirm_password)?;

    // Re-verify the current password before accepting a new one.
    let user = state.db.get_user(user_id).await.map_err(|e| {
        error!("Failed to load user: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile".to_string())
    })?;
    let creds = state.db.get_user_by_email(&user.email).await.map_err(|e| {
        error!("Failed to load credentials: {:?}", e);
        match e {
            PortError::NotFound(_) => (StatusCode::UNAUTHORIZED, "Account not found".to_string()),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load profile".to_string()),
        }
    })?;
    if !verify_password(&req.current_password, &creds.hashed_password)? {
        return Err((StatusCode::UNAUTHORIZED, "Current password is incorrect".to_string()));
    }

    let password_hash = hash_password(&req.new_password)?;
    state
        .db
        .update_password_hash(user_id, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to update password: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to update password".to_string())
        })?;
    Ok(StatusCode::OK)
}
