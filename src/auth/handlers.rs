// HTTP handlers for authentication endpoints

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{ApiError, MessageResponse, ValidationErrorResponse};
use crate::multipart::FormData;
use crate::AppState;

/// Register a new user
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body(content = RegisterRequest, content_type = "multipart/form-data",
        description = "Registration fields plus an optional `profile_image` file"),
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed (`{errors}`) or email/phone already registered (`{message}`)",
            body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut form = FormData::from_multipart(multipart).await?;
    let image = form.take_image();
    let request = RegisterRequest::from_form(&form);

    tracing::debug!("Registration attempt (image attached: {})", image.is_some());
    let response = state.auth_service.register(request, image).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login with email or phone
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing login fields", body = ValidationErrorResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse,
            example = json!({"message": "Invalid Credentials (Email/Phone or Password)"}))
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}
