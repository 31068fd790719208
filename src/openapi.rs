// OpenAPI documentation
// Swagger UI at /swagger-ui, document at /api-docs/openapi.json

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::models::{AuthResponse, LoginRequest, RegisterRequest, Role};
use crate::error::{MessageResponse, ValidationErrorResponse};
use crate::users::models::{UpdateUserRequest, UpdateUserResponse, UserResponse};
use crate::validation::FieldError;

/// Bearer JWT scheme referenced by the protected endpoints
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token returned by register or login"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::auth::handlers::register_handler,
        crate::auth::handlers::login_handler,
        crate::users::handlers::list_users_handler,
        crate::users::handlers::get_user_handler,
        crate::users::handlers::update_user_handler,
        crate::users::handlers::delete_user_handler,
    ),
    components(
        schemas(
            Role,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UserResponse,
            UpdateUserRequest,
            UpdateUserResponse,
            MessageResponse,
            ValidationErrorResponse,
            FieldError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "User roster administration")
    ),
    info(
        title = "Roster API",
        version = "1.0.0",
        description = "User roster administration with JWT authentication"
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_routes_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["paths"]["/api/auth/register"]["post"].is_object());
        assert!(json["paths"]["/api/users/{id}"]["delete"].is_object());
        assert_eq!(
            json["components"]["securitySchemes"]["bearer_auth"]["scheme"],
            "bearer"
        );
    }
}
