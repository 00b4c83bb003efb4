//! # Stratus Core
//!
//! Account record types, value resolution and file parsing shared by every
//! Stratus credential source.
//!
//! ## Example
//!
//! ```
//! use stratus_core::{AccountFormat, AccountFormatParser, KubernetesAccount, ValueResolver};
//!
//! let parser: AccountFormatParser<KubernetesAccount> =
//!     AccountFormatParser::new(AccountFormat::Yaml, ValueResolver::default());
//!
//! let accounts = parser
//!     .parse(b"kubernetes:\n  accounts:\n    - name: kube-1\n", "inline")
//!     .unwrap();
//! assert_eq!(accounts[0].name, "kube-1");
//! ```

pub mod account;
pub mod error;
pub mod format;
pub mod parser;
pub mod secret;
pub mod types;

pub use account::{
    AccountRecord, AwsAccount, AwsRegion, CloudFoundryAccount, DockerRegistryAccount, EcsAccount,
    KubernetesAccount, Properties,
};
pub use error::{Result, StratusError};
pub use format::AccountFormat;
pub use parser::AccountFormatParser;
pub use secret::{PassthroughResolver, ProcessEnv, SecretResolver, ValueResolver, VariableLookup};
pub use types::ProviderKey;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
