//! # Stratus Sources
//!
//! Account sources for the Stratus credential ingestion pipeline.
//!
//! Exactly one source backs an ingestion:
//!
//! - [`DirectorySource`] scans a directory tree for account files
//! - [`UrlSource`] reads one document from a `file://` or `http(s)://` URL
//! - git mode scans a local clone kept fresh by [`stratus_git::GitSyncEngine`]
//!
//! [`IngestionSettings`] loads and validates which one, and
//! [`CredentialIngestion`] hands out a source per provider record type.
//!
//! ## Example
//!
//! ```ignore
//! use stratus_core::{KubernetesAccount, ValueResolver};
//! use stratus_sources::{CredentialIngestion, IngestionSettings};
//!
//! let source = IngestionSettings::load(None)?.validate()?;
//! let ingestion = CredentialIngestion::new(source, ValueResolver::default()).await?;
//! let _handle = ingestion.start();
//!
//! let kube = ingestion.source::<KubernetesAccount>()?;
//! for account in kube.list().await? {
//!     println!("{}", account.name);
//! }
//! ```

pub mod directory;
pub mod ingestion;
pub mod settings;
pub mod source;
pub mod url;

pub use directory::DirectorySource;
pub use ingestion::CredentialIngestion;
pub use settings::{DirSettings, FilePrefixes, GitSettings, IngestionSettings, SourceConfig, UrlSettings};
pub use source::AccountSource;
pub use url::UrlSource;
