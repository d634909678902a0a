//! geofence_server: REST server for users and fence queries.
//!
//! Configuration comes from the environment (see `geofence_users::config`);
//! the process refuses to start without a reachable database.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use geofence_users::api::{create_router, AppState};
use geofence_users::config::AppConfig;
use geofence_users::database::DatabaseManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,geofence_users=debug,tower_http=debug".into()),
        )
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    let db = DatabaseManager::new(&config.database)
        .await
        .context("failed to connect to database")?;
    db.test_connection()
        .await
        .context("database connectivity check failed")?;

    if config.auto_migrate {
        db.run_migrations()
            .await
            .context("failed to apply schema")?;
    }

    let state = AppState::new(Arc::new(db.user_store()));
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("geofence_server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    tracing::info!("geofence_server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
