//! Clone and pull strategies.
//!
//! Two implementations exist: [`ShellTransport`] drives the system `git`
//! binary, [`EmbeddedTransport`] uses gix. [`select_transport`] checks for
//! `git` once and picks the shell strategy when it is available.

mod embedded;
mod shell;

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

pub use embedded::EmbeddedTransport;
pub use shell::ShellTransport;

use crate::config::GitSyncConfig;
use crate::error::GitSyncError;

/// A way of materializing the account repository on disk.
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Returns the strategy name for logs.
    fn name(&self) -> &'static str;

    /// Clones the repository into `target`, which exists and is empty.
    async fn clone_repo(&self, target: &Path) -> Result<(), GitSyncError>;

    /// Brings an existing clone at `target` up to date.
    async fn pull_changes(&self, target: &Path) -> Result<(), GitSyncError>;
}

/// Returns true if `git --version` succeeds within `timeout`.
pub async fn git_available(timeout: Duration) -> bool {
    let mut command = Command::new("git");
    command
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) if output.status.success() => {
            info!(
                "Found {}",
                String::from_utf8_lossy(&output.stdout).trim()
            );
            true
        },
        Ok(Ok(output)) => {
            warn!("`git --version` exited with {}", output.status);
            false
        },
        Ok(Err(e)) => {
            info!("git command not available: {}", e);
            false
        },
        Err(_) => {
            warn!("`git --version` didn't finish after {:?}", timeout);
            false
        },
    }
}

/// Picks the transport for `config`, preferring the system `git` binary.
pub async fn select_transport(config: &GitSyncConfig) -> Arc<dyn GitTransport> {
    if git_available(config.command_timeout()).await {
        info!("Using git command line to sync {}", config.repo());
        Arc::new(ShellTransport::new(config))
    } else {
        info!("Using embedded git library to sync {}", config.repo());
        Arc::new(EmbeddedTransport::new(config))
    }
}
