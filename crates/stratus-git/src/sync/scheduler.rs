//! Background sync scheduler.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::engine::GitSyncEngine;

/// Handle for controlling a running sync scheduler.
///
/// Dropping the handle stops the scheduler.
pub struct SyncHandle {
    /// Sender to signal shutdown.
    shutdown_tx: watch::Sender<bool>,
}

impl SyncHandle {
    /// Signals the scheduler to stop after the current cycle.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Runs [`GitSyncEngine::run_cycle`] on a fixed interval.
///
/// The first cycle runs immediately. Cycles never overlap; a cycle that
/// overruns the period pushes the next one a full period out instead of
/// firing the missed ticks back to back. A failed cycle is logged and
/// retried on the next tick without backoff.
pub struct SyncScheduler {
    engine: Arc<GitSyncEngine>,
}

impl SyncScheduler {
    /// Creates a new sync scheduler.
    pub fn new(engine: Arc<GitSyncEngine>) -> Self {
        Self { engine }
    }

    /// Starts the background sync task.
    ///
    /// Returns a handle that can be used to stop the scheduler.
    pub fn start(self) -> SyncHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = SyncHandle { shutdown_tx };

        tokio::spawn(self.run(shutdown_rx));

        handle
    }

    /// Runs the scheduler loop.
    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let period = self.engine.config().sync_interval();
        let mut interval_timer = cycle_timer(period);

        info!(
            "Starting git sync of {} every {:?}",
            self.engine.config().repo(),
            period
        );

        loop {
            tokio::select! {
                _ = interval_timer.tick() => {
                    self.do_cycle().await;
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Git sync scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Performs a single cycle, logging instead of propagating failures.
    async fn do_cycle(&self) {
        match self.engine.run_cycle().await {
            Ok(outcome) => debug!("Git sync cycle finished: {:?}", outcome),
            Err(e) if e.is_transient() => warn!(
                "Failed to sync git repository {}: {}",
                self.engine.config().repo(),
                e
            ),
            Err(e) => error!(
                "Failed to sync git repository {}, retrying will not help until the settings change: {}",
                self.engine.config().repo(),
                e
            ),
        }
    }
}

/// Ticks every `period`, delaying rather than bursting after a slow cycle.
fn cycle_timer(period: std::time::Duration) -> Interval {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}
