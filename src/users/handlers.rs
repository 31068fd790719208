// HTTP handlers for user directory endpoints

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::{ApiError, MessageResponse, ValidationErrorResponse};
use crate::multipart::FormData;
use crate::users::models::{SearchQuery, UpdateUserRequest, UpdateUserResponse, UserResponse};
use crate::AppState;

/// Malformed ids cannot name a record, so they are reported as not found
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!("Malformed user id: {}", raw);
        ApiError::NotFound
    })
}

/// List non-admin users
/// GET /api/users?search=
#[utoipa::path(
    get,
    path = "/api/users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching users, newest first", body = Vec<UserResponse>),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Caller is not an admin", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.user_service.list(query.search.as_deref()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a single user
/// GET /api/users/:id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Not the caller's own record", body = MessageResponse,
            example = json!({"message": "Not authorized to view this user."})),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = parse_id(&id)?;
    let found = state.user_service.get_by_id(id, &user).await?;
    Ok(Json(found.into()))
}

/// Update a user
/// PUT /api/users/:id
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body(content = UpdateUserRequest, content_type = "multipart/form-data",
        description = "Fields to change plus an optional `profile_image` file"),
    responses(
        (status = 200, description = "User updated", body = UpdateUserResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Caller is not an admin", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UpdateUserResponse>, ApiError> {
    let id = parse_id(&id)?;
    let mut form = FormData::from_multipart(multipart).await?;
    let image = form.take_image();
    let request = UpdateUserRequest::from_form(&form);

    let updated = state.user_service.update(id, request, image).await?;
    Ok(Json(UpdateUserResponse::new(&updated)))
}

/// Delete a user
/// DELETE /api/users/:id
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User removed", body = MessageResponse,
            example = json!({"message": "User removed successfully."})),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 403, description = "Target is another admin", body = MessageResponse,
            example = json!({"message": "Cannot delete another admin."})),
        (status = 404, description = "User not found", body = MessageResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    state.user_service.delete(id, &user).await?;
    Ok(Json(MessageResponse::new("User removed successfully.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("not-a-uuid"), Err(ApiError::NotFound)));
        assert!(matches!(parse_id("42"), Err(ApiError::NotFound)));
    }
}
