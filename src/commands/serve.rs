//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, InMemoryUserStore, UserRepository, UserStore};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let repo: Arc<dyn UserRepository> = if args.in_memory {
        tracing::warn!(
            delete_policy = %config.delete_policy,
            "Using in-memory store; records are lost on exit, and soft-deleted records stay in memory and are scanned on every lookup"
        );
        Arc::new(InMemoryUserStore::new(config.delete_policy))
    } else {
        let db = Database::connect(&config).await?;
        Arc::new(UserStore::new(db.get_connection(), config.delete_policy))
    };
    tracing::info!(delete_policy = %config.delete_policy, "User store ready");

    let app_state = AppState::from_repository(repo, config.store_timeout);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolve once Ctrl+C is received
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Received shutdown signal, stopping server...");
}
