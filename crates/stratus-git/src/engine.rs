//! The clone-or-pull state machine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::GitSyncConfig;
use crate::error::GitSyncError;
use crate::sync::{SyncHandle, SyncScheduler, SyncState};
use crate::transport::{self, GitTransport};

/// What a sync cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The target directory was recreated and cloned.
    Cloned,
    /// An existing clone was pulled.
    Pulled,
}

/// Keeps a local clone of the account repository up to date.
///
/// A cycle clones when the engine has never cloned or when the clone
/// directory disappeared, and pulls otherwise. The target directory is
/// deleted and recreated only right before a clone.
pub struct GitSyncEngine {
    config: GitSyncConfig,
    transport: Arc<dyn GitTransport>,
    state: Arc<SyncState>,
    cycle_lock: Mutex<()>,
}

impl GitSyncEngine {
    /// Creates an engine, checking for the system `git` binary to pick a transport.
    ///
    /// Anything already at the clone path is deleted.
    pub async fn new(config: GitSyncConfig) -> Result<Self, GitSyncError> {
        let transport = transport::select_transport(&config).await;
        let engine = Self::with_transport(config, transport);
        engine.clear_clone_dir().await?;
        Ok(engine)
    }

    /// Creates an engine with an explicit transport.
    pub fn with_transport(config: GitSyncConfig, transport: Arc<dyn GitTransport>) -> Self {
        info!(
            "Git sync of {} ({} auth, branch {}) into {}",
            config.repo(),
            config.auth().kind(),
            config.branch(),
            config.local_clone_dir().display()
        );

        Self {
            config,
            transport,
            state: Arc::new(SyncState::new()),
            cycle_lock: Mutex::new(()),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GitSyncConfig {
        &self.config
    }

    /// Returns the shared clone state.
    pub fn state(&self) -> Arc<SyncState> {
        Arc::clone(&self.state)
    }

    /// Returns the selected transport's name.
    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Returns the directory account files are read from.
    pub fn content_root(&self) -> PathBuf {
        self.config.content_root()
    }

    /// Starts the background scheduler for this engine.
    pub fn start(self: &Arc<Self>) -> SyncHandle {
        SyncScheduler::new(Arc::clone(self)).start()
    }

    /// Runs one clone-or-pull cycle and records the result.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, GitSyncError> {
        let _guard = self.cycle_lock.lock().await;

        let result = self.sync_once().await;
        match &result {
            Ok(_) => self.state.record_success(),
            Err(e) => self.state.record_failure(e.to_string()),
        }
        result
    }

    async fn sync_once(&self) -> Result<CycleOutcome, GitSyncError> {
        let target = self.config.local_clone_dir();

        if self.state.is_initialized() && has_content(target).await? {
            debug!("Pulling {} in {}", self.config.repo(), target.display());
            self.transport.pull_changes(target).await?;
            return Ok(CycleOutcome::Pulled);
        }

        if self.state.is_initialized() {
            info!("Clone directory {} is gone, cloning again", target.display());
        }

        self.clear_clone_dir().await?;
        tokio::fs::create_dir_all(target).await?;

        info!(
            "Cloning {} into {} with {} transport",
            self.config.repo(),
            target.display(),
            self.transport.name()
        );
        self.transport.clone_repo(target).await?;
        self.state.mark_initialized();

        info!("Repository {} cloned", self.config.repo());
        Ok(CycleOutcome::Cloned)
    }

    async fn clear_clone_dir(&self) -> Result<(), GitSyncError> {
        match tokio::fs::remove_dir_all(self.config.local_clone_dir()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for GitSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitSyncEngine")
            .field("repo", &self.config.repo())
            .field("local_clone_dir", &self.config.local_clone_dir())
            .field("transport", &self.transport.name())
            .field("state", &self.state)
            .finish()
    }
}

async fn has_content(dir: &Path) -> Result<bool, GitSyncError> {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
