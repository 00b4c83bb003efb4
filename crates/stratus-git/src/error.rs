//! Error types for git synchronization.

use std::path::PathBuf;

use stratus_core::StratusError;

/// Authentication settings that can't be applied to the repository.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Credentials must be embedded in the URL but the repository isn't one.
    #[error("invalid repository url {repo}: credentials can only be embedded in scheme://host/path urls")]
    NotAUrl { repo: String },

    /// The configured SSH identity file doesn't exist.
    #[error("SSH private key file {} doesn't exist", .0.display())]
    MissingIdentityFile(PathBuf),
}

/// Errors that can occur while cloning or pulling the account repository.
#[derive(Debug, thiserror::Error)]
pub enum GitSyncError {
    /// A git command exited unsuccessfully.
    #[error("command `{command}` failed with {status}: {output}")]
    Command {
        command: String,
        status: String,
        output: String,
    },

    /// A git command didn't finish in time and was killed.
    #[error("timeout waiting for command `{command}` to finish after {seconds}s")]
    Timeout { command: String, seconds: u64 },

    /// The embedded git library failed.
    #[error("git error: {0}")]
    Gix(String),

    /// Authentication is misconfigured.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A background task panicked or was cancelled.
    #[error("sync task failed: {0}")]
    Task(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitSyncError {
    /// Creates a new embedded git error.
    pub fn gix(msg: impl Into<String>) -> Self {
        Self::Gix(msg.into())
    }

    /// Returns true if the next cycle might succeed without a config change.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Command { .. } | Self::Timeout { .. } | Self::Gix(_) | Self::Io(_)
        )
    }

    /// Converts into a fetch error attributed to `repo`.
    pub fn into_fetch_error(self, repo: &str) -> StratusError {
        let message = self.to_string();
        StratusError::fetch_error_with_cause(repo, message, self)
    }
}

impl From<GitSyncError> for StratusError {
    fn from(err: GitSyncError) -> Self {
        err.into_fetch_error("git repository")
    }
}
