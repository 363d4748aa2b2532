use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use commerce_api::{
    auth::TokenService, config::AppConfig, create_router, db, memory::MemoryStore, AppState,
    Repositories,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls verbosity, info by default
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Commerce API - Starting...");

    let config = AppConfig::from_env()?;
    let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.jwt_duration_secs));

    let repos = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;

            // Run SQLx migrations on startup
            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed successfully");

            if config.seed_demo_data && db::seed_demo_data(&pool).await? {
                tracing::info!("Demo data loaded");
            }
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store; data is lost on exit");
            let store = if config.seed_demo_data {
                MemoryStore::seeded()?
            } else {
                MemoryStore::new()
            };
            Repositories::memory(Arc::new(store))
        }
    };

    let app = create_router(AppState::new(repos, tokens));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Commerce API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
