//! Fairway Server - Main entry point

use anyhow::Result;
use fairway_common::logging::{init_logging, LogConfig};
use fairway_sync::SyncConfig;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tracing::info;

use fairway_server::{
    api::{self, AppState},
    config::Config,
    scheduler::{SyncScheduler, SyncService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::builder()
        .log_file_prefix("fairway-server".to_string())
        .filter_directives("fairway_server=debug,fairway_sync=debug,tower_http=debug,sqlx=info".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting Fairway Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    // Shared sync entry point for the scheduler and the trigger endpoint
    let sync_config = SyncConfig::from_env()?;
    let sync_service = SyncService::new(db_pool.clone(), sync_config);

    // Start the recurring sync if enabled
    let _scheduler_handle = if config.scheduler.enabled {
        let scheduler = SyncScheduler::new(sync_service.clone(), &config.scheduler);
        let handle = scheduler.start();
        info!("Sync scheduler started");
        Some(handle)
    } else {
        info!("Sync scheduling is disabled (FAIRWAY_SYNC_ENABLED=false)");
        None
    };

    // Create application state
    let state = AppState {
        db: db_pool,
        sync: sync_service,
    };

    // Build the application router
    let app = api::router(state, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
