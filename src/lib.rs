// Roster API
// User roster administration over HTTP: registration and login with JWTs,
// admin-gated search, update and removal, and profile image uploads

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod multipart;
pub mod openapi;
pub mod storage;
pub mod users;
pub mod validation;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{admin_only, protect, AuthService, PasswordService, TokenService};
use config::AppConfig;
use openapi::ApiDoc;
use storage::ImageStore;
use users::{UserRepository, UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire the services together from their collaborators
    pub fn new(
        repo: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStore>,
        passwords: PasswordService,
        config: &AppConfig,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(
            &config.jwt.secret,
            config.jwt.access_ttl,
            config.jwt.refresh_ttl,
        ));
        let user_service = Arc::new(UserService::new(repo, images.clone(), passwords.clone()));
        let auth_service = Arc::new(AuthService::new(
            user_service.clone(),
            images,
            passwords,
            tokens.clone(),
            config.admin_email.clone(),
        ));

        Self {
            auth_service,
            user_service,
            tokens,
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Creates and configures the application router
///
/// Every `/api/users` route requires a valid access token; all but `GET /:id`
/// additionally require the admin role.
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let user_routes = Router::new()
        .route(
            "/",
            get(users::list_users_handler).route_layer(from_fn(admin_only)),
        )
        .route(
            "/:id",
            get(users::get_user_handler).merge(
                put(users::update_user_handler)
                    .delete(users::delete_user_handler)
                    .route_layer(from_fn(admin_only)),
            ),
        )
        .route_layer(from_fn_with_state(state.tokens.clone(), protect));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler))
        .nest("/api/users", user_routes)
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
