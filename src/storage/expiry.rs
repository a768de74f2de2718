//! Background Expiry Sweeper
//!
//! This module implements a background task that periodically scans the
//! store and evicts entries whose inactivity window has lapsed. This is
//! "active eviction" as opposed to "lazy eviction" (which happens on access).
//!
//! Lazy eviction alone has a gap: an entry that lapses and is never read
//! again would sit in memory forever. The sweeper closes that gap. A read
//! that arrives between sweeps still never sees a lapsed entry, because
//! `ClipboardStore::get` checks the deadline itself.
//!
//! The sweeper runs as a Tokio task that:
//! 1. Sleeps for a configurable interval (default: 1s)
//! 2. Wakes up and removes every lapsed entry
//! 3. Logs how much was evicted

use crate::storage::ClipboardStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Interval between sweeps (default: 1s)
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// A handle to the running expiry sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Starts the expiry sweeper as a background task.
    ///
    /// # Arguments
    ///
    /// * `store` - The store to sweep
    /// * `config` - Configuration for the sweeper
    ///
    /// # Returns
    ///
    /// Returns a handle that can be used to stop the sweeper.
    /// The sweeper will automatically stop when the handle is dropped.
    pub fn start(store: Arc<ClipboardStore>, config: SweeperConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(store, config, shutdown_rx));

        info!("Background expiry sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the expiry sweeper.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        info!("Background expiry sweeper stopped");
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main sweeper loop.
async fn sweeper_loop(
    store: Arc<ClipboardStore>,
    config: SweeperConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        // Wait for the interval or shutdown signal
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let evicted = store.cleanup_expired();

        if evicted > 0 {
            debug!(
                evicted = evicted,
                remaining = store.len(),
                "Lapsed clips evicted"
            );
        }
    }
}

/// Starts the expiry sweeper with default configuration.
///
/// This is a convenience function for simple use cases.
pub fn start_expiry_sweeper(store: Arc<ClipboardStore>) -> ExpirySweeper {
    ExpirySweeper::start(store, SweeperConfig::default())
}
