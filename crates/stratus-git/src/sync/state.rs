//! Clone state shared between the sync task and its readers.

use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Tracks the local clone for readiness checks and diagnostics.
///
/// Only the sync task writes it. `initialized` goes from false to true once
/// and stays true.
#[derive(Debug)]
pub struct SyncState {
    /// Whether the first clone completed.
    initialized: RwLock<bool>,
    /// The last successful cycle time.
    last_success: RwLock<Option<Instant>>,
    /// The last error message, if any.
    last_error: RwLock<Option<String>>,
    /// Number of consecutive failures.
    failure_count: RwLock<u32>,
    /// Number of completed cycles, successful or not.
    cycles: RwLock<u64>,
}

impl SyncState {
    /// Creates a new SyncState.
    pub fn new() -> Self {
        Self {
            initialized: RwLock::new(false),
            last_success: RwLock::new(None),
            last_error: RwLock::new(None),
            failure_count: RwLock::new(0),
            cycles: RwLock::new(0),
        }
    }

    /// Returns true once the first clone has completed.
    pub fn is_initialized(&self) -> bool {
        *self.initialized.read()
    }

    /// Marks the clone as available to readers.
    pub fn mark_initialized(&self) {
        *self.initialized.write() = true;
    }

    /// Records a successful cycle.
    pub fn record_success(&self) {
        let mut last_success = self.last_success.write();
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();
        let mut cycles = self.cycles.write();

        *last_success = Some(Instant::now());
        *last_error = None;
        *failure_count = 0;
        *cycles += 1;
    }

    /// Records a failed cycle.
    pub fn record_failure(&self, error: impl Into<String>) {
        let mut last_error = self.last_error.write();
        let mut failure_count = self.failure_count.write();
        let mut cycles = self.cycles.write();

        *last_error = Some(error.into());
        *failure_count += 1;
        *cycles += 1;
    }

    /// Returns the duration since the last successful cycle.
    pub fn time_since_success(&self) -> Option<Duration> {
        self.last_success.read().map(|t| t.elapsed())
    }

    /// Returns the last error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// Returns the number of consecutive failures.
    pub fn failure_count(&self) -> u32 {
        *self.failure_count.read()
    }

    /// Returns the number of completed cycles.
    pub fn cycle_count(&self) -> u64 {
        *self.cycles.read()
    }

    /// Returns true if the clone is available and the last cycle succeeded.
    pub fn is_healthy(&self) -> bool {
        self.is_initialized() && self.last_error.read().is_none()
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
