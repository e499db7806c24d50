use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::JwtAuth;
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::verify_password;
use crate::domain::user::{Email, UserSummary};

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserSummary,
}

/// Login with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;

    let email = Email::new(&req.email)
        .map_err(|e| ApiError::bad_request(format!("Invalid email: {}", e)))?;

    let user = state
        .users
        .find_by_email(&email)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    // Account state is only revealed to a caller holding the password
    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        ApiError::internal_server_error(format!("Password verification failed: {}", e))
    })?;
    if !valid {
        tracing::warn!(email = %email, "failed login attempt");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.is_active {
        return Err(ApiError::unauthorized("Account is disabled"));
    }

    let token = create_token(&user.actor(), &state.tokens.secret, state.tokens.ttl_hours)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to create token: {}", e)))?;
    tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: UserSummary::from(&user),
    }))
}

/// Current user
///
/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    JwtAuth(actor): JwtAuth,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(actor.id)
        .await
        .map_err(|e| ApiError::internal_server_error(format!("Database error: {}", e)))?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: UserSummary::from(&user),
    }))
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
