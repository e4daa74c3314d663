//! Server lifecycle: wiring, startup, graceful shutdown

use crate::config::RelayConfig;
use crate::error::{Result, ServerError};
use futures::stream::StreamExt;
use relay_api::{AppState, create_router};
use relay_engine::{DeliveryEngine, Reaper};
use signal_hook::consts::signal::{SIGINT, SIGQUIT, SIGTERM};
use signal_hook_tokio::Signals;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// The relay server: one delivery engine, its transport, and the reaper.
///
/// Registry and store are rebuilt empty at every start; there is no
/// warm-restart state.
pub struct RelayServer {
    config: RelayConfig,
    engine: Arc<DeliveryEngine>,
}

impl RelayServer {
    /// Create a server from a validated configuration
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            engine: Arc::new(DeliveryEngine::new()),
        }
    }

    /// Get a handle to the delivery engine
    pub fn engine(&self) -> Arc<DeliveryEngine> {
        self.engine.clone()
    }

    /// Run the server until a shutdown signal arrives.
    ///
    /// Binds the listener, spawns the reaper, serves the API, and on
    /// SIGTERM/SIGINT drains connections, stops the reaper, and returns.
    pub async fn start(&self) -> Result<()> {
        let (shutdown_tx, _) = broadcast::channel::<()>(4);

        // Reaper lifecycle is scoped to this call: spawned here,
        // guaranteed a shutdown signal before we return
        let reaper = Reaper::new(self.engine.clone(), self.config.reaper.clone());
        let reaper_task = reaper.spawn(shutdown_tx.subscribe());

        let state = AppState::new(self.engine.clone(), self.config.api.clone());
        let router = create_router(state, &self.config.api);

        let address = format!(
            "{}:{}",
            self.config.server.bind_address, self.config.server.port
        );
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| ServerError::Service {
                service: "api".to_string(),
                error: format!("failed to bind {address}: {e}"),
            })?;

        info!(address = %address, "relay server listening");

        let signals = Signals::new([SIGTERM, SIGINT, SIGQUIT])
            .map_err(|e| ServerError::Signal(e.to_string()))?;
        let signals_handle = signals.handle();

        axum::serve(listener, router)
            .with_graceful_shutdown(wait_for_shutdown_signal(signals))
            .await
            .map_err(|e| ServerError::Service {
                service: "api".to_string(),
                error: e.to_string(),
            })?;

        signals_handle.close();

        // Stop the reaper and wait for it within the shutdown budget
        let _ = shutdown_tx.send(());
        match tokio::time::timeout(self.config.server.shutdown_timeout, reaper_task).await {
            Ok(_) => {
                info!("relay server stopped");
                Ok(())
            }
            Err(_) => {
                warn!("reaper did not stop within the shutdown timeout");
                Err(ServerError::ShutdownTimeout)
            }
        }
    }
}

/// Resolve once a termination signal arrives
async fn wait_for_shutdown_signal(mut signals: Signals) {
    while let Some(signal) = signals.next().await {
        match signal {
            SIGTERM => {
                info!("Received SIGTERM, initiating graceful shutdown");
                break;
            }
            SIGINT => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                break;
            }
            SIGQUIT => {
                warn!("Received SIGQUIT, initiating graceful shutdown");
                break;
            }
            other => {
                warn!("Received unknown signal: {}", other);
            }
        }
    }
}
