//! Taskboard server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use taskboard::{
    api::{self, AppState},
    auth::TokenService,
    config::Config,
    observability,
    services::seed_demo_data,
    store::{postgres::Database, OrgStore, UserStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    observability::init(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Taskboard Server"
    );

    // Connect to database and apply migrations
    let db = Arc::new(Database::new(&config.database.url, config.database.max_connections).await?);
    db.migrate().await?;
    tracing::info!("Connected to database, migrations applied");

    // Seed demo data once, against an empty database only
    let orgs: Arc<dyn OrgStore> = db.clone();
    let users: Arc<dyn UserStore> = db.clone();
    seed_demo_data(&orgs, &users).await?;

    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_secs,
    ));
    let state = AppState::new(db, tokens);
    let app = api::build_router(state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
