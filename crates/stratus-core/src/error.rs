//! Error types for Stratus.
//!
//! This module defines the error hierarchy shared by every stage of the
//! credential ingestion pipeline. All errors implement the standard
//! `std::error::Error` trait via `thiserror`.
//!
//! # Severity
//!
//! - [`StratusError::Configuration`] is raised at startup and is fatal.
//! - [`StratusError::Parse`] and [`StratusError::MissingAccountsKey`] are scoped
//!   to a single file. Directory sources log and skip them, URL sources
//!   surface them for the whole poll.
//! - [`StratusError::Fetch`] covers URL and git transport failures.
//!
//! # Example
//!
//! ```
//! use stratus_core::{Result, StratusError};
//!
//! fn require_path(path: &str) -> Result<&str> {
//!     if path.is_empty() {
//!         return Err(StratusError::configuration("dir.path", "should not be empty"));
//!     }
//!     Ok(path)
//! }
//!
//! assert!(require_path("").unwrap_err().is_configuration_error());
//! ```

use std::io;
use thiserror::Error;

/// Main error type for Stratus operations.
#[derive(Debug, Error)]
pub enum StratusError {
    /// Static configuration is invalid, missing or conflicting.
    #[error("Invalid configuration for '{field}': {message}")]
    Configuration {
        /// Setting that failed validation
        field: String,
        /// Why it's invalid
        message: String,
    },

    /// Content could not be parsed in the declared format or converted to
    /// the target account type.
    #[error("Failed to parse accounts from '{source_name}': {message}")]
    Parse {
        /// Source of the content (file path, URL, etc.)
        source_name: String,
        /// Description of the parse error
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A provider-keyed map has no `accounts` list.
    #[error("Provider '{provider}' in '{source_name}' doesn't have an \"accounts\" entry")]
    MissingAccountsKey {
        /// Source of the content
        source_name: String,
        /// Provider key whose section is incomplete
        provider: String,
    },

    /// The source could not be opened or transferred.
    #[error("Failed to fetch '{source_name}': {message}")]
    Fetch {
        /// URL, repository or path that failed
        source_name: String,
        /// Description of what went wrong
        message: String,
        /// Underlying error
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StratusError {
    /// Creates a Configuration error.
    pub fn configuration(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a Parse error without a cause.
    pub fn parse_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Parse error with a cause.
    pub fn parse_error_with_cause<E>(
        source: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Parse {
            source_name: source.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Creates a MissingAccountsKey error.
    pub fn missing_accounts_key(source: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::MissingAccountsKey {
            source_name: source.into(),
            provider: provider.into(),
        }
    }

    /// Creates a Fetch error without a cause.
    pub fn fetch_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            source_name: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a Fetch error with a cause.
    pub fn fetch_error_with_cause<E>(
        source: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Fetch {
            source_name: source.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    // ============================================
    // Query methods
    // ============================================

    /// Returns true if this is a startup configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns true if this error has parse severity.
    ///
    /// A missing `accounts` list counts as a parse error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::MissingAccountsKey { .. })
    }

    /// Returns true if this is a fetch/transport error.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Type alias for Results with StratusError.
pub type Result<T> = std::result::Result<T, StratusError>;
