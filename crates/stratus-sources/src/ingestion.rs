//! The host-facing ingestion façade.

use std::sync::Arc;

use stratus_core::{AccountRecord, Result, StratusError, ValueResolver};
use stratus_git::{GitSyncEngine, SyncHandle};
use tracing::info;

use crate::directory::DirectorySource;
use crate::settings::{FilePrefixes, SourceConfig};
use crate::source::AccountSource;
use crate::url::UrlSource;

/// Builds account sources for every provider from one validated [`SourceConfig`].
///
/// In git mode the façade owns the sync engine; call [`start`](Self::start)
/// to begin cloning. Sources handed out before the first clone list nothing.
pub struct CredentialIngestion {
    source: SourceConfig,
    resolver: ValueResolver,
    engine: Option<Arc<GitSyncEngine>>,
}

impl CredentialIngestion {
    /// Creates the façade. In git mode this checks for `git` and clears the
    /// clone directory.
    pub async fn new(source: SourceConfig, resolver: ValueResolver) -> Result<Self> {
        let engine = match &source {
            SourceConfig::Git { config, .. } => Some(Arc::new(GitSyncEngine::new(config.clone()).await?)),
            _ => None,
        };

        info!("Account ingestion from {} source", source.kind());

        Ok(Self {
            source,
            resolver,
            engine,
        })
    }

    /// Creates a git-mode façade around an existing engine.
    pub fn from_engine(engine: Arc<GitSyncEngine>, prefixes: FilePrefixes, resolver: ValueResolver) -> Self {
        Self {
            source: SourceConfig::Git {
                config: engine.config().clone(),
                prefixes,
            },
            resolver,
            engine: Some(engine),
        }
    }

    /// Returns the git engine in git mode.
    pub fn git_engine(&self) -> Option<&Arc<GitSyncEngine>> {
        self.engine.as_ref()
    }

    /// Starts background git synchronization. Returns `None` outside git mode.
    pub fn start(&self) -> Option<SyncHandle> {
        self.engine.as_ref().map(GitSyncEngine::start)
    }

    /// Returns a source listing `T` accounts.
    pub fn source<T: AccountRecord>(&self) -> Result<Box<dyn AccountSource<T>>> {
        match &self.source {
            SourceConfig::Directory { path, prefixes } => Ok(Box::new(DirectorySource::<T>::new(
                path.clone(),
                prefixes.prefixes(T::PROVIDER),
                self.resolver.clone(),
            ))),
            SourceConfig::Url { url, format } => {
                Ok(Box::new(UrlSource::<T>::new(url, *format, self.resolver.clone())?))
            },
            SourceConfig::Git { prefixes, .. } => {
                let Some(engine) = &self.engine else {
                    return Err(StratusError::configuration("git", "no sync engine for git source"));
                };

                let source = DirectorySource::<T>::new(
                    engine.content_root(),
                    prefixes.prefixes(T::PROVIDER),
                    self.resolver.clone(),
                )
                .with_readiness(engine.state());
                Ok(Box::new(source))
            },
        }
    }
}

impl std::fmt::Debug for CredentialIngestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIngestion")
            .field("source", &self.source.kind())
            .field("engine", &self.engine)
            .finish()
    }
}
