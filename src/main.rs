use std::sync::Arc;

use roster_api::{
    auth::PasswordService,
    config::AppConfig,
    create_router, db,
    storage::LocalImageStore,
    users::{InMemoryUserRepository, PgUserRepository, UserRepository},
    AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("roster_api=debug,tower_http=info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Roster API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let repo: Arc<dyn UserRepository> = match &config.database_url {
        Some(url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(url)
                .await
                .expect("Failed to create database pool");
            db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            Arc::new(PgUserRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory user store (data is lost on restart)");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    let images = LocalImageStore::new(config.upload_dir.clone());
    images
        .ensure_root()
        .await
        .expect("Failed to create upload directory");
    tracing::info!("Storing uploads in {}", images.root().display());

    let state = AppState::new(repo, Arc::new(images), PasswordService::new(), &config);
    let app = create_router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Roster API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
