//! Media Cache - resilient cache layer for a media-tracking client
//!
//! Serves the shared cache store to local collaborators over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_cache::api::{create_router, AppState};
use media_cache::cache::{CacheStore, DynMedium, FileMedium, MemoryMedium, SystemClock};
use media_cache::Config;

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the storage medium (file-backed or in-memory)
/// 4. Create the cache store and Axum router
/// 5. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting media cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: quota={}B, max_entry={}B, eviction_fraction={}, port={}",
        config.quota_bytes, config.max_entry_bytes, config.eviction_fraction, config.server_port
    );

    let medium: DynMedium = match &config.cache_file {
        Some(path) => {
            let medium = FileMedium::open(path, config.quota_bytes)
                .with_context(|| format!("opening cache file {}", path.display()))?;
            info!("Using cache file {}", path.display());
            Box::new(medium)
        }
        None => {
            info!("Using in-memory cache medium");
            Box::new(MemoryMedium::new(config.quota_bytes))
        }
    };

    let store = CacheStore::new(medium, config.store_config(), Arc::new(SystemClock));
    info!("Cache store initialized with {} entries", store.len());

    let app = create_router(AppState::new(store));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
