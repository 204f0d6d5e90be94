//! Error type system for authgate
//!
//! This module provides the error type shared by every layer:
//! - Client-facing kinds (bad body, validation, duplicates, credentials)
//! - Internal failures that are logged in full but surfaced generically
//! - HTTP status code mapping
//! - JSON error bodies with trace IDs

use crate::api::middleware::trace::current_trace_id;
use crate::auth::validation::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Message returned to clients for every 5xx response
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Which unique user attribute collided during registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Email,
    Username,
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicateField::Email => write!(f, "Email"),
            DuplicateField::Username => write!(f, "Username"),
        }
    }
}

/// Main error type for authgate
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors
    #[error("Request body is not valid JSON")]
    InvalidBody,

    #[error("Invalid input")]
    Validation(ValidationErrors),

    #[error("{0} already in use")]
    DuplicateUser(DuplicateField),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    // Server errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    PoolError(#[from] r2d2::Error),

    #[error("Password hashing error: {0}")]
    HashError(#[from] bcrypt::BcryptError),

    #[error("Token signing error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task error: {0}")]
    TaskError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidBody
            | AppError::Validation(_)
            | AppError::DuplicateUser(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            }

            AppError::ConfigError(_)
            | AppError::DatabaseError(_)
            | AppError::PoolError(_)
            | AppError::HashError(_)
            | AppError::TokenError(_)
            | AppError::IoError(_)
            | AppError::TaskError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error kind identifier for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidBody => "INVALID_BODY",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::DuplicateUser(_) => "DUPLICATE_USER",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Whether this error hides its detail from the caller
    pub fn is_internal(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message that is safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::Unauthenticated(_) => "Authentication required".to_string(),
            e if e.is_internal() => INTERNAL_ERROR_MESSAGE.to_string(),
            e => e.to_string(),
        }
    }
}

/// Error response structure for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error kind identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Field-level validation messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    /// Unique trace ID for this error
    pub trace_id: String,
}

impl ErrorResponse {
    /// Create an error response from an AppError, tagged with the current
    /// request's trace ID (or a fresh one outside a request)
    pub fn from_error(error: &AppError) -> Self {
        let errors = match error {
            AppError::Validation(fields) => Some(fields.as_map().clone()),
            _ => None,
        };

        Self {
            error: error.error_code().to_string(),
            message: error.public_message(),
            errors,
            trace_id: current_trace_id().unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if self.is_internal() {
            tracing::error!(
                error_code = self.error_code(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::warn!(
                error_code = self.error_code(),
                trace_id = %error_response.trace_id,
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with AppError
pub type Result<T> = std::result::Result<T, AppError>;
