// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::fmt;
use tracing::{error, warn};

use crate::auth::models::Role;
use crate::error::{MessageResponse, INTERNAL_MESSAGE};

/// Authentication and authorization error types
///
/// Token failures of every kind collapse into `InvalidToken`, and unknown accounts and
/// wrong passwords both surface as `InvalidCredentials`.
#[derive(Debug)]
pub enum AuthError {
    // Authentication errors
    MissingToken,
    InvalidToken,
    InvalidCredentials,
    PasswordHashError(String),
    TokenGenerationError(String),

    // Authorization errors
    /// User lacks required role for the operation
    InsufficientPermissions {
        required: Role,
        actual: Role,
    },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
            AuthError::InsufficientPermissions { required, actual } => {
                write!(
                    f,
                    "Insufficient permissions: required role '{}', but user has role '{}'",
                    required, actual
                )
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Message safe to send to clients
    pub fn error_message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Not authorized, no token provided.",
            AuthError::InvalidToken => "Not authorized, token failed or expired.",
            AuthError::InvalidCredentials => "Invalid Credentials (Email/Phone or Password)",
            AuthError::PasswordHashError(_) => INTERNAL_MESSAGE,
            AuthError::TokenGenerationError(_) => INTERNAL_MESSAGE,
            AuthError::InsufficientPermissions { .. } => "Not authorized as an admin.",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::MissingToken => warn!("Missing token in request"),
            AuthError::InvalidToken => warn!("Invalid or expired token attempt"),
            AuthError::InvalidCredentials => warn!("Login rejected"),
            AuthError::PasswordHashError(msg) => error!("Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => error!("Token generation error: {}", msg),
            AuthError::InsufficientPermissions { required, actual } => {
                warn!(
                    "Authorization failed: required role '{}', user has role '{}'",
                    required, actual
                )
            }
        }

        let body = Json(MessageResponse::new(self.error_message()));
        (self.status_code(), body).into_response()
    }
}
