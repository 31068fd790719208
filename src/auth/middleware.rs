// Authentication middleware for protected routes

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Identity attached to a request once its bearer token is verified
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Authentication stage: requires a valid access token and records the caller's identity
pub async fn protect(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let endpoint = request.uri().path().to_string();

    let token = bearer_token(request.headers()).ok_or_else(|| {
        warn!("No bearer token on request to protected endpoint: {}", endpoint);
        AuthError::MissingToken
    })?;

    let claims = tokens.verify_access(token)?;

    debug!(
        "Authenticated user_id={}, role={}, endpoint={}",
        claims.sub, claims.role, endpoint
    );
    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.sub,
        role: claims.role,
    });
    Ok(next.run(request).await)
}

/// Authorization stage: only admins pass. Must run after `protect`.
pub async fn admin_only(request: Request, next: Next) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AuthError::MissingToken)?;

    if !user.is_admin() {
        warn!(
            "Authorization failed: user_id={}, required_role={}, actual_role={}, endpoint={}",
            user.user_id,
            Role::Admin,
            user.role,
            request.uri().path()
        );
        return Err(AuthError::InsufficientPermissions {
            required: Role::Admin,
            actual: user.role,
        });
    }

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
        Router,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    fn token_service() -> Arc<TokenService> {
        Arc::new(TokenService::new(
            "test_secret_key_for_testing_purposes",
            Duration::from_secs(3600),
            Duration::from_secs(604800),
        ))
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        user.user_id.to_string()
    }

    fn app(tokens: Arc<TokenService>) -> Router {
        let admin = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(from_fn(admin_only));
        Router::new()
            .route("/me", get(whoami))
            .merge(admin)
            .route_layer(from_fn_with_state(tokens, protect))
    }

    async fn call(app: Router, uri: &str, auth: Option<&str>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_missing_or_non_bearer_header_is_unauthorized() {
        let tokens = token_service();
        assert_eq!(call(app(tokens.clone()), "/me", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            call(app(tokens.clone()), "/me", Some("Basic dXNlcjpwYXNz")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(call(app(tokens), "/me", Some("Bearer ")).await, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(header::AUTHORIZATION, "Token abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_valid_access_token_is_accepted() {
        let tokens = token_service();
        let id = Uuid::new_v4();
        let token = tokens.generate_access_token(id, Role::User).unwrap();

        let response = app(tokens)
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalid_and_refresh_tokens_are_rejected() {
        let tokens = token_service();
        let refresh = tokens.generate_refresh_token(Uuid::new_v4(), Role::Admin).unwrap();

        assert_eq!(
            call(app(tokens.clone()), "/me", Some("Bearer not.a.token")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            call(app(tokens), "/me", Some(&format!("Bearer {}", refresh))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_admin_only_checks_role() {
        let tokens = token_service();
        let user = tokens.generate_access_token(Uuid::new_v4(), Role::User).unwrap();
        let admin = tokens.generate_access_token(Uuid::new_v4(), Role::Admin).unwrap();

        assert_eq!(
            call(app(tokens.clone()), "/admin", Some(&format!("Bearer {}", user))).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            call(app(tokens), "/admin", Some(&format!("Bearer {}", admin))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_extractor_without_protect_is_unauthorized() {
        let mut parts = HttpRequest::builder().uri("/").body(()).unwrap().into_parts().0;
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingToken)));
    }
}
