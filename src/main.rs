use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use teamdesk_api::api::{self, AppState, TokenSettings};
use teamdesk_api::application::bootstrap;
use teamdesk_api::config::AppConfig;
use teamdesk_api::domain::repositories::{DepartmentRepository, TeamRepository, UserRepository};
use teamdesk_api::infrastructure::repositories::{
    InMemoryDepartmentRepository, InMemoryTeamRepository, InMemoryUserRepository,
    PostgresDepartmentRepository, PostgresTeamRepository, PostgresUserRepository,
};

type Repositories = (
    Arc<dyn TeamRepository>,
    Arc<dyn UserRepository>,
    Arc<dyn DepartmentRepository>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;

    let (teams, users, departments) = repositories(&config).await?;

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::ensure_admin(users.as_ref(), admin).await?;
    }

    let state = AppState::new(
        teams,
        users,
        departments,
        TokenSettings {
            secret: config.jwt_secret.clone(),
            ttl_hours: config.token_ttl_hours,
        },
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    tracing::info!("Server listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn repositories(config: &AppConfig) -> Result<Repositories, Box<dyn std::error::Error>> {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory storage");
        return Ok((
            Arc::new(InMemoryTeamRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryDepartmentRepository::default()),
        ));
    };

    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database connected and migrated");

    Ok((
        Arc::new(PostgresTeamRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(PostgresDepartmentRepository::new(pool)),
    ))
}
