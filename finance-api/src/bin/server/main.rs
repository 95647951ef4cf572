use std::sync::Arc;

use auth::Authenticator;
use chrono::Duration;
use finance_api::config::Config;
use finance_api::domain::user::ports::UserDirectory;
use finance_api::domain::user::service::AuthService;
use finance_api::inbound::http::router::create_router;
use finance_api::outbound::repositories::InMemoryUserDirectory;
use finance_api::outbound::repositories::PostgresUserDirectory;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finance_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "finance-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        database_configured = config.database.url.is_some(),
        access_token_ttl_secs = config.jwt.access_token_expiration_secs,
        refresh_token_ttl_secs = config.jwt.refresh_token_expiration_secs,
        require_email_verification = config.registration.require_email_verification,
        "Configuration loaded"
    );

    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes())?.with_token_ttls(
            Duration::seconds(config.jwt.access_token_expiration_secs),
            Duration::seconds(config.jwt.refresh_token_expiration_secs),
        ),
    );

    let user_directory: Arc<dyn UserDirectory> = match &config.database.url {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(PostgresUserDirectory::new(pg_pool))
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory only");
            Arc::new(InMemoryUserDirectory::new())
        }
    };

    let auth_service = Arc::new(
        AuthService::new(Arc::clone(&user_directory), Arc::clone(&authenticator))
            .with_email_verification(config.registration.require_email_verification),
    );

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        auth_service,
        user_directory,
        authenticator,
        &config.cors.allowed_origins,
    );

    axum::serve(http_listener, http_application).await?;
    tracing::info!("Server exited successfully");

    Ok(())
}
