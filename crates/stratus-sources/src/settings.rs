//! Ingestion settings.
//!
//! Settings are read from an optional file (YAML, JSON or TOML, picked by
//! extension) layered under `STRATUS__<SECTION>__<KEY>` environment
//! variables, then validated into a [`SourceConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use stratus_core::{AccountFormat, ProviderKey, Result, StratusError};
use stratus_git::GitSyncConfig;

/// Environment variable prefix for settings overrides.
pub const ENV_PREFIX: &str = "STRATUS";

/// Top-level ingestion settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionSettings {
    pub dir: DirSettings,
    pub url: UrlSettings,
    pub git: GitSettings,
}

/// Static directory source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirSettings {
    pub enabled: bool,
    pub path: Option<PathBuf>,
    pub file_prefix: FilePrefixes,
}

/// Single URL source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlSettings {
    pub enabled: bool,
    pub url: Option<String>,
    /// `YAML` or `JSON`, case-insensitive. Required when enabled.
    pub format: Option<String>,
}

/// Git-backed directory source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub enabled: bool,
    pub sync_interval_secs: u64,
    pub repo: Option<String>,
    pub branch: String,
    /// Defaults to a fresh directory under the system temp dir.
    pub local_clone_dir: Option<PathBuf>,
    pub repo_subdir: String,
    pub command_timeout_secs: u64,
    pub file_prefix: FilePrefixes,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub ssh_private_key_file_path: Option<PathBuf>,
    #[serde(skip_serializing)]
    pub ssh_private_key_passphrase: Option<String>,
    pub ssh_known_hosts_file_path: Option<PathBuf>,
    pub ssh_trust_unknown_hosts: bool,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            sync_interval_secs: 60,
            repo: None,
            branch: "master".to_string(),
            local_clone_dir: None,
            repo_subdir: String::new(),
            command_timeout_secs: 30,
            file_prefix: FilePrefixes::default(),
            username: None,
            password: None,
            token: None,
            ssh_private_key_file_path: None,
            ssh_private_key_passphrase: None,
            ssh_known_hosts_file_path: None,
            ssh_trust_unknown_hosts: false,
        }
    }
}

/// File name prefixes accepted by a directory scan.
///
/// A provider's source accepts files starting with `default` or with that
/// provider's own prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePrefixes {
    pub default: String,
    pub kubernetes: String,
    pub cloudfoundry: String,
    pub aws: String,
    pub ecs: String,
    pub docker_registry: String,
}

impl Default for FilePrefixes {
    fn default() -> Self {
        Self {
            default: "clouddriver".to_string(),
            kubernetes: "kube".to_string(),
            cloudfoundry: "cf".to_string(),
            aws: "aws".to_string(),
            ecs: "ecs".to_string(),
            docker_registry: "dockerRegistry".to_string(),
        }
    }
}

impl FilePrefixes {
    /// Returns the prefixes a source for `provider` accepts.
    pub fn prefixes(&self, provider: ProviderKey) -> Vec<String> {
        let own = match provider {
            ProviderKey::Kubernetes => &self.kubernetes,
            ProviderKey::CloudFoundry => &self.cloudfoundry,
            ProviderKey::Aws => &self.aws,
            ProviderKey::Ecs => &self.ecs,
            ProviderKey::DockerRegistry => &self.docker_registry,
        };

        [&self.default, own]
            .into_iter()
            .filter(|prefix| !prefix.is_empty())
            .cloned()
            .collect()
    }
}

/// The one source selected by validated settings.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Directory {
        path: PathBuf,
        prefixes: FilePrefixes,
    },
    Url {
        url: String,
        format: AccountFormat,
    },
    Git {
        config: GitSyncConfig,
        prefixes: FilePrefixes,
    },
}

impl SourceConfig {
    /// Returns the source kind for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Directory { .. } => "dir",
            SourceConfig::Url { .. } => "url",
            SourceConfig::Git { .. } => "git",
        }
    }
}

impl IngestionSettings {
    /// Loads settings from an optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, Self::environment())
    }

    /// Loads settings from an optional file and an explicit environment layer.
    pub fn load_from(path: Option<&Path>, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(environment)
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| StratusError::configuration("settings", e.to_string()))
    }

    /// The environment layer: `STRATUS__GIT__REPO` sets `git.repo`.
    pub fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Checks that exactly one source is enabled and fully configured.
    pub fn validate(&self) -> Result<SourceConfig> {
        let enabled: Vec<&str> = [
            ("dir", self.dir.enabled),
            ("url", self.url.enabled),
            ("git", self.git.enabled),
        ]
        .into_iter()
        .filter_map(|(name, on)| on.then_some(name))
        .collect();

        match enabled.as_slice() {
            ["dir"] => self.dir.validate(),
            ["url"] => self.url.validate(),
            ["git"] => self.git.validate(),
            [] => Err(StratusError::configuration(
                "sources",
                "one of dir, url or git must be enabled",
            )),
            many => Err(StratusError::configuration(
                "sources",
                format!("only one source may be enabled, found {}", many.join(", ")),
            )),
        }
    }
}

impl DirSettings {
    fn validate(&self) -> Result<SourceConfig> {
        let path = self
            .path
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| StratusError::configuration("dir.path", "should not be empty"))?;

        Ok(SourceConfig::Directory {
            path,
            prefixes: self.file_prefix.clone(),
        })
    }
}

impl UrlSettings {
    fn validate(&self) -> Result<SourceConfig> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StratusError::configuration("url.url", "should not be empty"))?;

        let parsed = reqwest::Url::parse(url)
            .map_err(|e| StratusError::configuration("url.url", format!("'{}' is not an absolute URL: {}", url, e)))?;
        if !matches!(parsed.scheme(), "file" | "http" | "https") {
            return Err(StratusError::configuration(
                "url.url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let format = self
            .format
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| StratusError::configuration("url.format", "should be one of [YAML, JSON]"))?
            .parse::<AccountFormat>()
            .map_err(|e| StratusError::configuration("url.format", e.to_string()))?;

        Ok(SourceConfig::Url {
            url: url.to_string(),
            format,
        })
    }
}

impl GitSettings {
    fn validate(&self) -> Result<SourceConfig> {
        let mut builder = GitSyncConfig::builder()
            .repo(self.repo.clone().unwrap_or_default())
            .branch(self.branch.clone())
            .repo_subdir(self.repo_subdir.clone())
            .sync_interval(Duration::from_secs(self.sync_interval_secs))
            .command_timeout(Duration::from_secs(self.command_timeout_secs))
            .ssh_trust_unknown_hosts(self.ssh_trust_unknown_hosts);

        if let Some(dir) = self.local_clone_dir.clone().filter(|p| !p.as_os_str().is_empty()) {
            builder = builder.local_clone_dir(dir);
        }
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username.clone(), self.password.clone().unwrap_or_default());
        }
        if let Some(token) = &self.token {
            builder = builder.token(token.clone());
        }
        if let Some(key) = &self.ssh_private_key_file_path {
            builder = builder.ssh_auth(key.clone());
        }
        if let Some(passphrase) = &self.ssh_private_key_passphrase {
            builder = builder.ssh_passphrase(passphrase.clone());
        }
        if let Some(known_hosts) = &self.ssh_known_hosts_file_path {
            builder = builder.ssh_known_hosts(known_hosts.clone());
        }

        Ok(SourceConfig::Git {
            config: builder.build()?,
            prefixes: self.file_prefix.clone(),
        })
    }
}
