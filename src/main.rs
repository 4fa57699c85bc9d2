use dotenvy::dotenv;
use feedlot::{
    api::{self, AppState},
    config::{database::create_connection, settings::load_app_configuration},
    core::migrations::run_migrations,
    errors::Result,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the main application configuration
    let app_config = load_app_configuration()?;
    if !app_config.auth.enabled {
        warn!("Authentication is disabled; every request runs as a local administrator");
    }

    // 4. Connect and bring the schema up to date
    let db = create_connection(&app_config.database)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    let applied = run_migrations(&db, &app_config)
        .await
        .inspect_err(|e| error!("Migrations failed: {}", e))?;
    info!(count = applied.len(), ?applied, "Migrations applied");

    // 5. Serve
    let addr: SocketAddr = app_config.server.bind_addr.parse()?;
    let app = api::router(AppState::new(Arc::new(db), &app_config));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
