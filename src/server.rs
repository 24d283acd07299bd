//! Server module for managing HTTP server lifecycle
//!
//! This module handles server initialization, startup, and graceful
//! shutdown. A termination signal is forwarded to the pool, which
//! cancels all jobs before the process exits.

use tokio::net::TcpListener;
use tokio::signal;

use crate::api::routes::create_router;
use crate::config::settings::Settings;
use crate::pool::PoolHandle;
use crate::state::AppState;

/// HTTP server manager
pub struct Server {
    settings: Settings,
}

impl Server {
    /// Create a new server with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Start the server and run until a shutdown signal arrives or the
    /// pool's shutdown token fires.
    ///
    /// # Errors
    /// - Address binding errors
    /// - Server runtime errors
    pub async fn run(self, state: AppState) -> anyhow::Result<()> {
        tracing::info!(
            host = %self.settings.server.host,
            port = %self.settings.server.port,
            request_timeout = %self.settings.server.request_timeout,
            "Server configuration loaded"
        );

        let pool = state.pool.clone();
        let router = create_router(state);
        tracing::info!("Router configured");

        let address = self.settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;

        tracing::info!(address = %address, "Control API listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal(pool))
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Waits for Ctrl+C, SIGTERM, or the pool loop finishing.
///
/// A signal triggers pool shutdown so every active job is cancelled
/// before the process terminates.
async fn shutdown_signal(pool: PoolHandle) {
    let token = pool.shutdown_token();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, cancelling all jobs");
            pool.shutdown();
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, cancelling all jobs");
            pool.shutdown();
        }
        _ = token.cancelled() => {
            tracing::info!("Pool stopped, shutting down control API");
        }
    }
}
