//! Embedded gix strategy, used when no `git` binary is available.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gix::remote::fetch::Shallow;
use tracing::{debug, info, warn};

use super::GitTransport;
use crate::auth::AuthConfig;
use crate::config::GitSyncConfig;
use crate::error::GitSyncError;
use crate::refs::GitRef;

/// Runs clone and pull in-process with gix.
///
/// A pull reads the tip `origin` advertises for the branch and compares it
/// with `HEAD`; when the remote moved the worktree is cloned again next to
/// the target and swapped in.
#[derive(Debug, Clone)]
pub struct EmbeddedTransport {
    repo: String,
    branch: GitRef,
    auth: AuthConfig,
}

impl EmbeddedTransport {
    /// Creates an embedded transport for `config`.
    pub fn new(config: &GitSyncConfig) -> Self {
        let auth = config.auth();

        if let AuthConfig::SshKey(ssh) = &auth
            && ssh.passphrase.is_some()
        {
            warn!(
                "Embedded git can't unlock passphrase protected keys, {} must already be loaded in an ssh-agent",
                ssh.private_key.display()
            );
        }

        Self {
            repo: config.repo().to_string(),
            branch: config.git_ref(),
            auth,
        }
    }

    fn check_auth(&self) -> Result<(), GitSyncError> {
        if let AuthConfig::SshKey(ssh) = &self.auth {
            ssh.check_identity()?;
        }
        Ok(())
    }

    /// Config overrides that route SSH through the configured identity.
    fn config_overrides(auth: &AuthConfig) -> Vec<String> {
        match auth {
            AuthConfig::SshKey(ssh) => vec![format!("core.sshCommand={}", ssh.ssh_command(true))],
            AuthConfig::None | AuthConfig::UsernamePassword { .. } | AuthConfig::Token { .. } => {
                Vec::new()
            },
        }
    }

    /// Blocking shallow clone of `branch` into `target`.
    fn clone_blocking(
        repo: &str,
        branch: &GitRef,
        auth: &AuthConfig,
        target: &Path,
    ) -> Result<(), GitSyncError> {
        let url = gix::url::parse(repo.into())
            .map_err(|e| GitSyncError::gix(format!("Invalid URL: {}", e)))?;

        let mut prepare = gix::prepare_clone(url, target)
            .map_err(|e| GitSyncError::gix(format!("Failed to prepare clone: {}", e)))?
            .with_shallow(Shallow::DepthAtRemote(NonZeroU32::MIN))
            .with_ref_name(Some(branch.full_name().as_str()))
            .map_err(|e| GitSyncError::gix(format!("Invalid branch {}: {}", branch, e)))?
            .with_in_memory_config_overrides(Self::config_overrides(auth));

        if let Some((username, password)) = auth.http_credentials() {
            let (username, password) = (username.to_string(), password.to_string());
            prepare = prepare.configure_connection(move |connection| {
                connection.set_credentials(credentials(username.clone(), password.clone()));
                Ok(())
            });
        }

        let (mut checkout, _outcome) = prepare
            .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| GitSyncError::gix(format!("Clone failed: {}", e)))?;

        checkout
            .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
            .map_err(|e| GitSyncError::gix(format!("Checkout failed: {}", e)))?;

        Ok(())
    }

    /// Blocking ref listing; returns the commit the remote advertises for `branch`.
    ///
    /// Only the ref advertisement is read, nothing is fetched and no local ref
    /// is touched.
    fn remote_tip_blocking(
        branch: &GitRef,
        auth: &AuthConfig,
        target: &Path,
    ) -> Result<gix::ObjectId, GitSyncError> {
        let options = gix::open::Options::default().config_overrides(Self::config_overrides(auth));
        let repo = gix::open_opts(target, options)
            .map_err(|e| GitSyncError::gix(format!("Failed to open repo: {}", e)))?;

        let remote = repo
            .find_default_remote(gix::remote::Direction::Fetch)
            .ok_or_else(|| GitSyncError::gix("No default remote found"))?
            .map_err(|e| GitSyncError::gix(format!("Failed to find remote: {}", e)))?;

        let mut connection = remote
            .connect(gix::remote::Direction::Fetch)
            .map_err(|e| GitSyncError::gix(format!("Failed to connect: {}", e)))?;

        if let Some((username, password)) = auth.http_credentials() {
            connection.set_credentials(credentials(username.to_string(), password.to_string()));
        }

        // A single-branch clone narrows the fetch refspec, so ask for every ref.
        let ref_map_options = gix::remote::ref_map::Options {
            prefix_from_spec_as_filter_on_remote: false,
            ..Default::default()
        };
        let (ref_map, _handshake) = connection
            .ref_map(gix::progress::Discard, ref_map_options)
            .map_err(|e| GitSyncError::gix(format!("Failed to list remote refs: {}", e)))?;

        let full_name = branch.full_name();
        ref_map
            .remote_refs
            .iter()
            .find_map(|remote_ref| {
                let (name, target, peeled) = remote_ref.unpack();
                (name == full_name.as_str())
                    .then(|| peeled.or(target).map(ToOwned::to_owned))
                    .flatten()
            })
            .ok_or_else(|| GitSyncError::gix(format!("Remote has no {}", full_name)))
    }

    /// Returns the commit checked out in `target`.
    fn head_blocking(target: &Path) -> Result<gix::ObjectId, GitSyncError> {
        let repo = gix::open(target).map_err(|e| GitSyncError::gix(format!("Failed to open repo: {}", e)))?;
        repo.head_id()
            .map(|id| id.detach())
            .map_err(|e| GitSyncError::gix(format!("Failed to read HEAD: {}", e)))
    }

    /// Blocking pull; returns true if the worktree had to be replaced.
    fn pull_blocking(
        repo: &str,
        branch: &GitRef,
        auth: &AuthConfig,
        target: &Path,
    ) -> Result<bool, GitSyncError> {
        let remote_tip = Self::remote_tip_blocking(branch, auth, target)?;
        let head = Self::head_blocking(target)?;
        debug!("Remote tip {}, HEAD {}", remote_tip, head);

        if remote_tip == head {
            return Ok(false);
        }

        Self::rematerialize_blocking(repo, branch, auth, target)?;
        Ok(true)
    }

    /// Clones into a sibling directory and swaps it in place of `target`.
    fn rematerialize_blocking(
        repo: &str,
        branch: &GitRef,
        auth: &AuthConfig,
        target: &Path,
    ) -> Result<(), GitSyncError> {
        let staging = staging_path(target);
        std::fs::create_dir_all(&staging)?;

        if let Err(e) = Self::clone_blocking(repo, branch, auth, &staging) {
            let _ = std::fs::remove_dir_all(&staging);
            return Err(e);
        }

        std::fs::remove_dir_all(target)?;
        std::fs::rename(&staging, target)?;
        Ok(())
    }
}

#[async_trait]
impl GitTransport for EmbeddedTransport {
    fn name(&self) -> &'static str {
        "embedded"
    }

    async fn clone_repo(&self, target: &Path) -> Result<(), GitSyncError> {
        self.check_auth()?;

        let repo = self.repo.clone();
        let branch = self.branch.clone();
        let auth = self.auth.clone();
        let target = target.to_path_buf();

        tokio::task::spawn_blocking(move || Self::clone_blocking(&repo, &branch, &auth, &target))
            .await
            .map_err(|e| GitSyncError::Task(format!("Clone task failed: {}", e)))?
    }

    async fn pull_changes(&self, target: &Path) -> Result<(), GitSyncError> {
        self.check_auth()?;

        let repo = self.repo.clone();
        let branch = self.branch.clone();
        let auth = self.auth.clone();
        let target = target.to_path_buf();

        let refreshed = tokio::task::spawn_blocking(move || Self::pull_blocking(&repo, &branch, &auth, &target))
            .await
            .map_err(|e| GitSyncError::Task(format!("Pull task failed: {}", e)))??;

        if refreshed {
            info!("Repository {} moved, worktree refreshed", self.repo);
        }
        Ok(())
    }
}

/// Answers credential requests with fixed HTTP credentials.
fn credentials(
    username: String,
    password: String,
) -> impl FnMut(gix::credentials::helper::Action) -> gix::credentials::protocol::Result {
    move |action| match action {
        gix::credentials::helper::Action::Get(ctx) => Ok(Some(gix::credentials::protocol::Outcome {
            identity: gix::sec::identity::Account {
                username: username.clone(),
                password: password.clone(),
            },
            next: ctx.into(),
        })),
        _ => Ok(None),
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "clone".to_string());
    let staging = format!(".{}.next-{}", name, uuid::Uuid::now_v7());

    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(staging),
        _ => std::env::temp_dir().join(staging),
    }
}
