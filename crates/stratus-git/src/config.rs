//! Git synchronization configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stratus_core::{Result, StratusError};

use crate::auth::AuthConfig;
use crate::refs::GitRef;

/// Configuration for the git synchronization engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitSyncConfig {
    /// The repository URL (HTTPS, SSH or a local path).
    repo: String,

    /// Branch or tag to clone.
    #[serde(default = "default_branch")]
    branch: String,

    /// Local path where the repository is cloned.
    #[serde(default = "default_local_clone_dir")]
    local_clone_dir: PathBuf,

    /// Directory inside the clone that holds the account files.
    #[serde(default)]
    repo_subdir: String,

    /// Interval between sync cycles.
    #[serde(default = "default_sync_interval", with = "humantime_serde")]
    sync_interval: Duration,

    /// Wall-clock bound for a single git command.
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    command_timeout: Duration,

    /// Username for HTTP authentication (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,

    /// Password for HTTP authentication (optional).
    #[serde(default, skip_serializing)]
    password: Option<String>,

    /// Token for HTTP authentication (optional).
    #[serde(default, skip_serializing)]
    token: Option<String>,

    /// SSH private key path (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ssh_private_key_file_path: Option<PathBuf>,

    /// SSH private key passphrase (optional).
    #[serde(default, skip_serializing)]
    ssh_private_key_passphrase: Option<String>,

    /// SSH known_hosts file (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ssh_known_hosts_file_path: Option<PathBuf>,

    /// Whether to accept unknown SSH host keys.
    #[serde(default)]
    ssh_trust_unknown_hosts: bool,
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_local_clone_dir() -> PathBuf {
    std::env::temp_dir().join(format!("stratus-{}", uuid::Uuid::now_v7()))
}

fn default_sync_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(30)
}

impl GitSyncConfig {
    /// Creates a new builder for GitSyncConfig.
    pub fn builder() -> GitSyncConfigBuilder {
        GitSyncConfigBuilder::default()
    }

    /// Returns the repository URL.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Returns the branch or tag to clone. Tags keep a `tags/` prefix.
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Returns the branch or tag as a reference.
    pub fn git_ref(&self) -> GitRef {
        GitRef::parse(&self.branch)
    }

    /// Returns the local clone directory.
    pub fn local_clone_dir(&self) -> &Path {
        &self.local_clone_dir
    }

    /// Returns the directory inside the clone that holds the account files.
    pub fn repo_subdir(&self) -> &str {
        &self.repo_subdir
    }

    /// Returns the interval between sync cycles.
    pub fn sync_interval(&self) -> Duration {
        self.sync_interval
    }

    /// Returns the timeout applied to every git command.
    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// Returns the username for HTTP authentication.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the password for HTTP authentication.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Returns the token for HTTP authentication.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns the SSH private key path.
    pub fn ssh_private_key_file_path(&self) -> Option<&Path> {
        self.ssh_private_key_file_path.as_deref()
    }

    /// Returns the SSH private key passphrase.
    pub fn ssh_private_key_passphrase(&self) -> Option<&str> {
        self.ssh_private_key_passphrase.as_deref()
    }

    /// Returns the SSH known_hosts file path.
    pub fn ssh_known_hosts_file_path(&self) -> Option<&Path> {
        self.ssh_known_hosts_file_path.as_deref()
    }

    /// Returns whether unknown SSH host keys are accepted.
    pub fn ssh_trust_unknown_hosts(&self) -> bool {
        self.ssh_trust_unknown_hosts
    }

    /// Returns the directory a directory source should scan.
    pub fn content_root(&self) -> PathBuf {
        let subdir = self.repo_subdir.trim_matches('/');
        if subdir.is_empty() {
            self.local_clone_dir.clone()
        } else {
            self.local_clone_dir.join(subdir)
        }
    }

    /// Resolves the authentication method from the credential fields.
    pub fn auth(&self) -> AuthConfig {
        AuthConfig::resolve(self)
    }
}

/// Builder for GitSyncConfig.
#[derive(Debug, Default)]
pub struct GitSyncConfigBuilder {
    repo: Option<String>,
    branch: Option<String>,
    local_clone_dir: Option<PathBuf>,
    repo_subdir: Option<String>,
    sync_interval: Option<Duration>,
    command_timeout: Option<Duration>,
    username: Option<String>,
    password: Option<String>,
    token: Option<String>,
    ssh_private_key_file_path: Option<PathBuf>,
    ssh_private_key_passphrase: Option<String>,
    ssh_known_hosts_file_path: Option<PathBuf>,
    ssh_trust_unknown_hosts: bool,
}

impl GitSyncConfigBuilder {
    /// Sets the repository URL.
    pub fn repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    /// Sets the branch or tag to clone.
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    /// Sets the local clone directory.
    pub fn local_clone_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.local_clone_dir = Some(path.into());
        self
    }

    /// Sets the directory inside the clone that holds the account files.
    pub fn repo_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.repo_subdir = Some(subdir.into());
        self
    }

    /// Sets the interval between sync cycles.
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.sync_interval = Some(interval);
        self
    }

    /// Sets the git command timeout.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Sets basic authentication credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets token authentication.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets SSH authentication.
    pub fn ssh_auth(mut self, private_key: impl Into<PathBuf>) -> Self {
        self.ssh_private_key_file_path = Some(private_key.into());
        self
    }

    /// Sets the SSH key passphrase.
    pub fn ssh_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.ssh_private_key_passphrase = Some(passphrase.into());
        self
    }

    /// Sets the SSH known_hosts file.
    pub fn ssh_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssh_known_hosts_file_path = Some(path.into());
        self
    }

    /// Sets whether unknown SSH host keys are accepted.
    pub fn ssh_trust_unknown_hosts(mut self, trust: bool) -> Self {
        self.ssh_trust_unknown_hosts = trust;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the repo is missing, the branch is not
    /// a valid reference name, or an interval is zero.
    pub fn build(self) -> Result<GitSyncConfig> {
        let repo = self
            .repo
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| StratusError::configuration("git.repo", "should not be empty"))?;

        let branch = match self.branch.filter(|b| !b.trim().is_empty()) {
            Some(branch) => {
                let git_ref = GitRef::parse(&branch);
                git_ref
                    .validate()
                    .map_err(|e| StratusError::configuration("git.branch", e))?;
                git_ref.to_string()
            },
            None => default_branch(),
        };

        let sync_interval = self.sync_interval.unwrap_or_else(default_sync_interval);
        if sync_interval.is_zero() {
            return Err(StratusError::configuration(
                "git.sync_interval_secs",
                "should be greater than zero",
            ));
        }

        let command_timeout = self.command_timeout.unwrap_or_else(default_command_timeout);
        if command_timeout.is_zero() {
            return Err(StratusError::configuration(
                "git.command_timeout_secs",
                "should be greater than zero",
            ));
        }

        Ok(GitSyncConfig {
            repo,
            branch,
            local_clone_dir: self.local_clone_dir.unwrap_or_else(default_local_clone_dir),
            repo_subdir: self.repo_subdir.unwrap_or_default(),
            sync_interval,
            command_timeout,
            username: self.username,
            password: self.password,
            token: self.token,
            ssh_private_key_file_path: self.ssh_private_key_file_path,
            ssh_private_key_passphrase: self.ssh_private_key_passphrase,
            ssh_known_hosts_file_path: self.ssh_known_hosts_file_path,
            ssh_trust_unknown_hosts: self.ssh_trust_unknown_hosts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_minimal() {
        let config = GitSyncConfig::builder()
            .repo("https://github.com/org/accounts.git")
            .build()
            .unwrap();

        assert_eq!(config.repo(), "https://github.com/org/accounts.git");
        assert_eq!(config.branch(), "master");
        assert_eq!(config.repo_subdir(), "");
        assert_eq!(config.sync_interval(), Duration::from_secs(60));
        assert_eq!(config.command_timeout(), Duration::from_secs(30));
        assert!(config.local_clone_dir().starts_with(std::env::temp_dir()));
    }

    #[test]
    fn test_tag_branch_keeps_its_kind() {
        for label in ["tags/v1", "refs/tags/v1"] {
            let config = GitSyncConfig::builder()
                .repo("https://github.com/org/accounts.git")
                .branch(label)
                .build()
                .unwrap();

            assert_eq!(config.branch(), "tags/v1");
            assert_eq!(config.git_ref(), GitRef::Tag("v1".to_string()));
        }
    }

    #[test]
    fn test_default_clone_dirs_are_unique() {
        let a = GitSyncConfig::builder().repo("https://h/r.git").build().unwrap();
        let b = GitSyncConfig::builder().repo("https://h/r.git").build().unwrap();
        assert_ne!(a.local_clone_dir(), b.local_clone_dir());
    }

    #[test]
    fn test_builder_full() {
        let config = GitSyncConfig::builder()
            .repo("https://github.com/org/accounts.git")
            .branch("refs/heads/develop")
            .local_clone_dir("/tmp/accounts")
            .repo_subdir("/clouddriver/")
            .sync_interval(Duration::from_secs(5))
            .basic_auth("user", "secret")
            .build()
            .unwrap();

        assert_eq!(config.branch(), "develop");
        assert_eq!(config.git_ref(), GitRef::Branch("develop".to_string()));
        assert_eq!(config.sync_interval(), Duration::from_secs(5));
        assert_eq!(config.username(), Some("user"));
        assert_eq!(config.password(), Some("secret"));
        assert_eq!(config.content_root(), PathBuf::from("/tmp/accounts/clouddriver"));
    }

    #[test]
    fn test_content_root_without_subdir() {
        let config = GitSyncConfig::builder()
            .repo("https://github.com/org/accounts.git")
            .local_clone_dir("/tmp/accounts")
            .build()
            .unwrap();
        assert_eq!(config.content_root(), PathBuf::from("/tmp/accounts"));
    }

    #[test]
    fn test_builder_rejects_invalid_values() {
        let err = GitSyncConfig::builder().build().unwrap_err();
        assert!(err.is_configuration_error());

        let err = GitSyncConfig::builder().repo("  ").build().unwrap_err();
        assert!(err.is_configuration_error());

        let err = GitSyncConfig::builder()
            .repo("https://h/r.git")
            .branch("bad branch")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("git.branch"));

        let err = GitSyncConfig::builder()
            .repo("https://h/r.git")
            .sync_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let config = GitSyncConfig::builder()
            .repo("https://h/r.git")
            .basic_auth("user", "secret")
            .build()
            .unwrap();

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"username\":\"user\""));
        assert!(!json.contains("secret"));
        assert!(json.contains("\"syncInterval\":60"));
    }
}

mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
