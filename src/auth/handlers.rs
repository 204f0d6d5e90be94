//! Authentication API handlers

use crate::api::server::AppState;
use crate::auth::middleware::AuthUser;
use crate::auth::models::{AuthResponse, MessageResponse, SessionResponse};
use crate::auth::validation::{validate_login, validate_register};
use crate::core::error::{AppError, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};

/// Parse a request body as a JSON object, before anything touches the store
fn parse_object(body: &Bytes) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(AppError::InvalidBody),
    }
}

/// Handler for POST /api/auth/register - User registration
pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let body = parse_object(&body)?;
    let input = validate_register(&body).map_err(AppError::Validation)?;

    tracing::info!(username = %input.username, "User registration attempt");

    let user = state.auth.register(input).await?;

    tracing::info!(
        user_id = %user.id,
        username = %user.username,
        "User registered successfully"
    );

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "Account created successfully".to_string(),
            user,
        }),
    ))
}

/// Handler for POST /api/auth/login - User login
pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let body = parse_object(&body)?;
    let input = validate_login(&body).map_err(AppError::Validation)?;

    let (user, token) = state.auth.login(input).await?;
    let cookie = state.session_cookie.issue(&token)?;

    tracing::info!(user_id = %user.id, username = %user.username, "Login successful");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AuthResponse {
            message: "Logged in successfully".to_string(),
            user,
        }),
    ))
}

/// Handler for GET /api/auth/me - Current session's user
pub async fn me(AuthUser(user): AuthUser) -> Json<SessionResponse> {
    Json(SessionResponse { user })
}

/// Handler for POST /api/auth/logout - Expire the session cookie
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, state.session_cookie.clear())],
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}
