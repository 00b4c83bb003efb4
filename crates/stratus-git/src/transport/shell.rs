//! Git command line strategy.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::GitTransport;
use crate::auth::AuthConfig;
use crate::config::GitSyncConfig;
use crate::error::GitSyncError;
use crate::refs::GitRef;

/// Loads the identity into the agent `ssh-agent` starts, then runs git with
/// the remaining arguments.
const SSH_AGENT_SCRIPT: &str = r#"ssh-add "$STRATUS_SSH_KEY" && exec git "$@""#;
const SSH_AGENT_SCRIPT_WITH_PASSPHRASE: &str =
    r#"printf '%s\n' "$STRATUS_SSH_PASSPHRASE" | ssh-add "$STRATUS_SSH_KEY" && exec git "$@""#;

/// Arguments for one git invocation, plus the credential-free form used in logs.
type GitArgs = (Vec<OsString>, String);

/// Runs clone and pull through the system `git` binary.
///
/// Every command is bounded by the configured timeout; a command that
/// overruns is killed and reported as [`GitSyncError::Timeout`].
#[derive(Debug, Clone)]
pub struct ShellTransport {
    repo: String,
    branch: GitRef,
    auth: AuthConfig,
    timeout: Duration,
}

impl ShellTransport {
    /// Creates a shell transport for `config`.
    pub fn new(config: &GitSyncConfig) -> Self {
        Self {
            repo: config.repo().to_string(),
            branch: config.git_ref(),
            auth: config.auth(),
            timeout: config.command_timeout(),
        }
    }

    /// Overrides the command timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds a `git` invocation with `args`, wrapped in `ssh-agent` for SSH auth.
    fn git_command(&self, args: Vec<OsString>) -> Result<Command, GitSyncError> {
        let mut command = match &self.auth {
            AuthConfig::SshKey(ssh) => {
                ssh.check_identity()?;

                let script = if ssh.passphrase.is_some() {
                    SSH_AGENT_SCRIPT_WITH_PASSPHRASE
                } else {
                    SSH_AGENT_SCRIPT
                };

                let mut command = Command::new("ssh-agent");
                command
                    .args(["bash", "-c", script, "bash"])
                    .args(args)
                    .env("STRATUS_SSH_KEY", &ssh.private_key)
                    .env("GIT_SSH_COMMAND", ssh.ssh_command(false));
                if let Some(passphrase) = &ssh.passphrase {
                    command.env("STRATUS_SSH_PASSPHRASE", passphrase);
                }
                command
            },
            AuthConfig::None | AuthConfig::UsernamePassword { .. } | AuthConfig::Token { .. } => {
                let mut command = Command::new("git");
                command.args(args);
                command
            },
        };

        command
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        Ok(command)
    }

    /// Runs `command`, returning its combined output.
    ///
    /// `shown` names the command in errors and must not carry credentials.
    async fn run(&self, shown: String, mut command: Command) -> Result<String, GitSyncError> {
        debug!("Running `{}`", shown);

        let child = command.spawn()?;
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            // dropping the future drops the child, which kills it
            Err(_) => {
                return Err(GitSyncError::Timeout {
                    command: shown,
                    seconds: self.timeout.as_secs(),
                });
            },
        };

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(combined)
        } else {
            Err(GitSyncError::Command {
                command: shown,
                status: output.status.to_string(),
                output: combined.trim().to_string(),
            })
        }
    }
}

#[async_trait]
impl GitTransport for ShellTransport {
    fn name(&self) -> &'static str {
        "shell"
    }

    async fn clone_repo(&self, target: &Path) -> Result<(), GitSyncError> {
        let url = self.auth.clone_url(&self.repo)?;
        let (args, shown) = self.clone_args(url, target);

        self.run(shown, self.git_command(args)?).await.map(drop)
    }

    async fn pull_changes(&self, target: &Path) -> Result<(), GitSyncError> {
        for (args, shown) in self.pull_args(target) {
            let output = self.run(shown, self.git_command(args)?).await?;
            debug!("git pull of {}: {}", self.repo, output.trim());
        }
        Ok(())
    }
}

impl ShellTransport {
    /// `git clone --branch <name> --depth 1 <url> <target>`; `--branch` takes
    /// branch and tag names alike.
    fn clone_args(&self, url: String, target: &Path) -> GitArgs {
        let args = vec![
            "clone".into(),
            "--branch".into(),
            self.branch.name().into(),
            "--depth".into(),
            "1".into(),
            url.into(),
            target.as_os_str().to_owned(),
        ];
        let shown = format!(
            "git clone --branch {} --depth 1 {} {}",
            self.branch.name(),
            self.repo,
            target.display()
        );
        (args, shown)
    }

    /// A branch clone pulls. A tag clone has a detached HEAD, so the tag is
    /// fetched again and checked out.
    fn pull_args(&self, target: &Path) -> Vec<GitArgs> {
        let dir = target.as_os_str().to_owned();
        let at = target.display();

        match &self.branch {
            GitRef::Branch(_) => vec![(
                vec!["-C".into(), dir, "pull".into()],
                format!("git -C {} pull", at),
            )],
            GitRef::Tag(_) => {
                let full_name = self.branch.full_name();
                let refspec = format!("+{0}:{0}", full_name);
                vec![
                    (
                        vec![
                            "-C".into(),
                            dir.clone(),
                            "fetch".into(),
                            "--depth".into(),
                            "1".into(),
                            "origin".into(),
                            refspec.clone().into(),
                        ],
                        format!("git -C {} fetch --depth 1 origin {}", at, refspec),
                    ),
                    (
                        vec![
                            "-C".into(),
                            dir,
                            "checkout".into(),
                            "--force".into(),
                            "--detach".into(),
                            full_name.clone().into(),
                        ],
                        format!("git -C {} checkout --force --detach {}", at, full_name),
                    ),
                ]
            },
        }
    }
}
