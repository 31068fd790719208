// Error handling module
// Central error taxonomy and HTTP response conversion for the roster API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::auth::error::AuthError;
use crate::validation::{field_errors, FieldError};

/// Main error type for the API
/// All handlers and services return Result<T, ApiError>
///
/// Each variant maps to a fixed HTTP status. Client-facing messages never carry
/// internal details; those are logged server-side only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Field-level validation failures, reported in order
    /// Maps to HTTP 400 Bad Request
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Email or phone already registered
    /// Maps to HTTP 400 Bad Request
    #[error("User with this email or phone already exists.")]
    DuplicateIdentity,

    /// Authentication and role failures from the access-control layer
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Ownership or role mismatch on a specific record
    /// Maps to HTTP 403 Forbidden
    #[error("{0}")]
    Forbidden(&'static str),

    /// Maps to HTTP 404 Not Found
    #[error("User not found.")]
    NotFound,

    /// Unreadable or oversized multipart body; status comes from axum
    #[error(transparent)]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Maps to HTTP 500; details are logged, never returned
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Image storage failures; maps to HTTP 500
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Maps to HTTP 500
    #[error("internal error: {0}")]
    Internal(String),
}

/// `{message}` body used for every non-validation error
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User not found.")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{errors: [{field, message}]}` body for validation failures
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<FieldError>,
}

pub const INTERNAL_MESSAGE: &str = "Internal server error.";

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateIdentity => StatusCode::BAD_REQUEST,
            ApiError::Auth(auth) => auth.status_code(),
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Multipart(rejection) => rejection.status(),
            ApiError::Database(_) | ApiError::Storage(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Single-field validation failure
    pub fn field(field: &str, message: &str) -> Self {
        ApiError::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::Validation(errors) => {
                debug!("Validation error: {:?}", errors);
                (status, Json(ValidationErrorResponse { errors })).into_response()
            }
            ApiError::Auth(auth) => auth.into_response(),
            ApiError::DuplicateIdentity => {
                debug!("Duplicate identity rejected");
                (status, Json(MessageResponse::new(self.to_string()))).into_response()
            }
            ApiError::Forbidden(message) => {
                warn!("Forbidden access attempt: {}", message);
                (status, Json(MessageResponse::new(message))).into_response()
            }
            ApiError::NotFound => {
                debug!("User not found");
                (status, Json(MessageResponse::new(self.to_string()))).into_response()
            }
            ApiError::Multipart(rejection) => {
                debug!("Multipart error: {}", rejection.body_text());
                (status, Json(MessageResponse::new(rejection.body_text()))).into_response()
            }
            ApiError::Database(db_error) => {
                error!("Database error: {:?}", db_error);
                (status, Json(MessageResponse::new(INTERNAL_MESSAGE))).into_response()
            }
            ApiError::Storage(io_error) => {
                error!("Image storage error: {:?}", io_error);
                (status, Json(MessageResponse::new(INTERNAL_MESSAGE))).into_response()
            }
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                (status, Json(MessageResponse::new(INTERNAL_MESSAGE))).into_response()
            }
        }
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(field_errors(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation(vec![]).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateIdentity.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_internal_details_are_not_rendered() {
        let response = ApiError::Internal("connection refused at 10.0.0.3".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
