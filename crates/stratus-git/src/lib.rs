//! # Stratus Git
//!
//! Keeps a local clone of an account repository up to date so a directory
//! source can read it.
//!
//! ## Features
//!
//! - Clone once, then pull on a fixed interval
//! - System `git` CLI when available, embedded gix otherwise
//! - Username/password, token and SSH key authentication
//! - Readiness flag so readers never see a half-made first clone
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stratus_git::{GitSyncConfig, GitSyncEngine};
//!
//! let config = GitSyncConfig::builder()
//!     .repo("https://github.com/org/accounts.git")
//!     .branch("master")
//!     .build()?;
//!
//! let engine = Arc::new(GitSyncEngine::new(config).await?);
//! let _handle = engine.start();
//! ```

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod refs;
pub mod sync;
pub mod transport;

// Re-exports
pub use auth::{AuthConfig, SshKeyAuth};
pub use config::{GitSyncConfig, GitSyncConfigBuilder};
pub use engine::{CycleOutcome, GitSyncEngine};
pub use error::{AuthError, GitSyncError};
pub use refs::GitRef;
pub use sync::{SyncHandle, SyncScheduler, SyncState};
pub use transport::{EmbeddedTransport, GitTransport, ShellTransport, git_available, select_transport};

// Re-export stratus_core for consumers
pub use stratus_core;
