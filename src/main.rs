use acl_service::auth::TokenService;
use acl_service::configuration::{get_configuration, DatabaseSettings};
use acl_service::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
use acl_service::startup::run;
use acl_service::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

async fn build_repository(settings: &DatabaseSettings) -> std::io::Result<Arc<dyn UserRepository>> {
    if settings.in_memory {
        tracing::warn!("Using the in-memory user store; data is lost on exit");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    tracing::info!(host = %settings.host, database = %settings.database_name, "Connecting to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&settings.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Database connection error")
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;
    tracing::info!("Database ready");

    Ok(Arc::new(PostgresUserRepository::new(pool)))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = get_configuration().map_err(|e| {
        tracing::error!("Failed to read configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "Configuration error")
    })?;

    let repository = build_repository(&configuration.database).await?;
    let tokens = TokenService::new(&configuration.jwt);

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!(address = %address, environment = ?configuration.application.environment, "Server listening");

    run(listener, repository, tokens, configuration.cookie)?.await
}
