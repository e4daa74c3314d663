//! Periodic eviction of results nobody picked up

use crate::engine::DeliveryEngine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

/// Retention and sweep cadence for the reaper.
///
/// An entry becomes eligible once its age exceeds the retention window,
/// and is actually evicted on the next sweep, so the eviction lag is
/// between zero and one sweep interval past the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// How long an unconsumed result stays retrievable
    pub retention_window: Duration,

    /// How often the sweep runs
    pub sweep_interval: Duration,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            retention_window: Duration::from_secs(300), // 5 minutes
            sweep_interval: Duration::from_secs(120),   // 2 minutes
        }
    }
}

/// Timer-driven sweep over the result store.
///
/// Runs until told to shut down; a sweep can never take the task down
/// with it, the schedule always continues.
pub struct Reaper {
    engine: Arc<DeliveryEngine>,
    config: ReaperConfig,
}

impl Reaper {
    /// Create a reaper over the given engine
    pub fn new(engine: Arc<DeliveryEngine>, config: ReaperConfig) -> Self {
        Self { engine, config }
    }

    /// Spawn the sweep loop; resolves once a shutdown signal arrives
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.config.sweep_interval);
            // The first tick of a tokio interval fires immediately; a sweep
            // right at startup would be a no-op, skip it.
            ticker.tick().await;

            info!(
                retention_secs = self.config.retention_window.as_secs(),
                sweep_secs = self.config.sweep_interval.as_secs(),
                "reaper started"
            );

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = self.engine.sweep(self.config.retention_window).await;
                        if removed > 0 {
                            info!(removed, "expired results reaped");
                        } else {
                            debug!("sweep found nothing to reap");
                        }
                    }
                    _ = shutdown.recv() => {
                        info!("reaper shutting down");
                        break;
                    }
                }
            }
        })
    }
}
