use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing::{error, info};

use user_api::{
    config::{Config, StoreConfig},
    create_router,
    db::Database,
    middleware::init_tracing,
    store::{MemoryUserStore, SharedUserStore},
};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_tracing(config.environment) {
        eprintln!("Failed to initialize tracing: {}", e);
        std::process::exit(1);
    }
    info!("Configuration loaded successfully");

    // Build the user store once; every request shares it
    let mut database = None;
    let store: SharedUserStore = match config.store {
        StoreConfig::Postgres(db_config) => match Database::new(db_config).await {
            Ok(db) => {
                info!("Database connection established");
                let db = Arc::new(db);
                database = Some(db.clone());
                db as SharedUserStore
            }
            Err(e) => {
                error!("Failed to connect to database: {}", e);
                std::process::exit(1);
            }
        },
        StoreConfig::Memory => {
            info!("Using in-memory user store; records are lost on shutdown");
            Arc::new(MemoryUserStore::new()) as SharedUserStore
        }
    };

    let app = create_router(store, config.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            info!("Server listening on {}", addr);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    if let Some(db) = database {
        db.close();
    }

    info!("Server shutdown complete");
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        },
    }
}
