use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User not found")]
    UserNotFound,
    #[error("Email already exists")]
    EmailAlreadyExists,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Invalid or expired reset token")]
    InvalidResetToken,
    #[error("Password validation failed: {0}")]
    PasswordValidation(PasswordError),
    #[error("Email validation failed: {0}")]
    EmailValidation(String),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashing(PasswordError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        if err.is_policy_violation() {
            AuthError::PasswordValidation(err)
        } else {
            AuthError::PasswordHashing(err)
        }
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeaderFormat
            | AuthError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::InvalidResetToken
            | AuthError::PasswordValidation(_)
            | AuthError::EmailValidation(_)
            | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::PasswordHashing(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AuthError::InvalidCredentials => "Invalid credentials",
            AuthError::UserNotFound => "User not found",
            AuthError::EmailAlreadyExists => "Email already exists",
            AuthError::InvalidToken => "Invalid token",
            AuthError::TokenExpired => "Token expired",
            AuthError::MissingAuthHeader => "Missing authorization header",
            AuthError::InvalidAuthHeaderFormat => "Invalid authorization header format",
            AuthError::InvalidResetToken => "Invalid reset token",
            AuthError::PasswordValidation(_) => "Password validation failed",
            AuthError::EmailValidation(_) => "Email validation failed",
            AuthError::Validation(_) => "Validation failed",
            AuthError::Database(_) => "Database error",
            AuthError::Jwt(_) => "Token error",
            AuthError::PasswordHashing(_) => "Password processing error",
            AuthError::Internal(_) => "Internal server error",
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Authentication failure: {}", self);
        }

        // Storage details stay in the logs
        let message = match &self {
            AuthError::Database(_) | AuthError::Internal(_) => error_message.to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "message": message,
        }));

        (status, body).into_response()
    }
}
