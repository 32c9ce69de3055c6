use agora::config::{
    auth::{AuthConfig, BootstrapAdminConfig},
    database::{get_database, DatabaseConfig},
    forum::ForumConfig,
    session::SessionConfig,
};
use agora::middleware::SecurityHeaders;
use agora::migration::Migrator;
use agora::services::bootstrap::{ensure_bootstrap_admin, seed_demo_content};
use agora::utils::{CookieSettings, CredentialStore, TokenCodec};
use agora::{create_app, AppState};
use sea_orm_migration::MigratorTrait;
use std::env;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let session_config = SessionConfig::from_env()?;
    let auth_config = AuthConfig::from_env()?;
    let forum_config = ForumConfig::from_env()?;
    let db_config = DatabaseConfig::from_env();

    tracing::info!(
        layout = %forum_config.layout,
        "Starting Agora v{}...",
        env!("CARGO_PKG_VERSION")
    );

    let db = get_database(&db_config).await?;
    tracing::info!("Database connected successfully");

    Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let credentials = CredentialStore::new(auth_config.bcrypt_cost)?;

    ensure_bootstrap_admin(&db, &credentials, BootstrapAdminConfig::from_env())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create bootstrap admin: {e}"))?;

    if forum_config.seed_demo_content {
        seed_demo_content(&db, forum_config.layout)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed demo content: {e}"))?;
    }

    let state = AppState {
        db,
        credentials,
        tokens: TokenCodec::new(&session_config),
        cookies: CookieSettings::from_env(),
        layout: forum_config.layout,
    };

    let app = create_app(state, SecurityHeaders::from_env());

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
