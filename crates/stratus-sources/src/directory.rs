//! Directory account source.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use stratus_core::{AccountFormat, AccountFormatParser, AccountRecord, Result, StratusError, ValueResolver};
use stratus_git::SyncState;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::source::AccountSource;

/// Reads accounts from every matching file under a directory tree.
///
/// A file matches when its extension is `yaml`, `yml` or `json` and its name
/// starts with one of the configured prefixes. Files that can't be read or
/// parsed are logged and skipped.
pub struct DirectorySource<T> {
    name: String,
    root: PathBuf,
    prefixes: Vec<String>,
    parser: AccountFormatParser<T>,
    readiness: Option<Arc<SyncState>>,
}

impl<T: AccountRecord> DirectorySource<T> {
    /// Creates a source scanning `root` for files starting with any of `prefixes`.
    pub fn new(root: impl Into<PathBuf>, prefixes: Vec<String>, resolver: ValueResolver) -> Self {
        let root = root.into();
        Self {
            name: format!("dir:{}", root.display()),
            root,
            prefixes,
            parser: AccountFormatParser::new(AccountFormat::Yaml, resolver),
            readiness: None,
        }
    }

    /// Gates the source on a git clone: nothing is listed until it is initialized.
    pub fn with_readiness(mut self, state: Arc<SyncState>) -> Self {
        self.readiness = Some(state);
        self
    }

    fn scan(root: &Path, prefixes: &[String], parser: &AccountFormatParser<T>) -> Vec<T> {
        if !root.exists() {
            warn!("Accounts directory {} doesn't exist", root.display());
            return Vec::new();
        }

        let mut accounts = Vec::new();

        for entry in WalkDir::new(root).into_iter().filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            },
        }) {
            let path = entry.path();
            if !path.is_file() || !matches_prefix(path, prefixes) || !AccountFormat::is_scanned(path) {
                continue;
            }

            let source = path.display().to_string();
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Unable to read accounts file {}: {}", source, e);
                    continue;
                },
            };

            match parser
                .with_format(AccountFormat::infer_from_path(path))
                .parse(&bytes, &source)
            {
                Ok(parsed) => {
                    debug!("Read {} {} accounts from {}", parsed.len(), T::PROVIDER, source);
                    accounts.extend(parsed);
                },
                Err(e) => warn!("Skipping accounts file {}: {}", source, e),
            }
        }

        accounts
    }
}

fn matches_prefix(path: &Path, prefixes: &[String]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| prefixes.iter().any(|prefix| name.starts_with(prefix.as_str())))
}

#[async_trait]
impl<T: AccountRecord> AccountSource<T> for DirectorySource<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self) -> Result<Vec<T>> {
        if let Some(state) = &self.readiness
            && !state.is_initialized()
        {
            debug!("{} not cloned yet, no {} accounts available", self.name, T::PROVIDER);
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let prefixes = self.prefixes.clone();
        let parser = self.parser.clone();

        tokio::task::spawn_blocking(move || Self::scan(&root, &prefixes, &parser))
            .await
            .map_err(|e| StratusError::fetch_error_with_cause(&self.name, "directory scan failed", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_prefix() {
        let prefixes = vec!["clouddriver".to_string(), "kube".to_string()];

        assert!(matches_prefix(Path::new("/a/kube-single.yml"), &prefixes));
        assert!(matches_prefix(Path::new("/a/clouddriver-local.yml"), &prefixes));
        assert!(!matches_prefix(Path::new("/a/cf-single.yml"), &prefixes));
        assert!(!matches_prefix(Path::new("/kube/accounts.yml"), &prefixes));
    }
}
