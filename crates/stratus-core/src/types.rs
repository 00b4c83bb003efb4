//! Common type definitions for Stratus.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StratusError;

/// Identifies the cloud provider an account record belongs to.
///
/// The key is also the name of the provider's section inside a
/// multi-provider document:
///
/// ```yaml
/// kubernetes:
///   accounts:
///     - name: kube-1
/// ```
///
/// # Example
///
/// ```
/// use stratus_core::ProviderKey;
///
/// let key: ProviderKey = "dockerRegistry".parse().unwrap();
/// assert_eq!(key, ProviderKey::DockerRegistry);
/// assert_eq!(key.as_str(), "dockerRegistry");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderKey {
    /// Kubernetes clusters.
    #[serde(rename = "kubernetes")]
    Kubernetes,
    /// Cloud Foundry foundations.
    #[serde(rename = "cloudfoundry")]
    CloudFoundry,
    /// AWS accounts.
    #[serde(rename = "aws")]
    Aws,
    /// ECS accounts.
    #[serde(rename = "ecs")]
    Ecs,
    /// Docker registries.
    #[serde(rename = "dockerRegistry")]
    DockerRegistry,
}

impl ProviderKey {
    /// Every supported provider, in a stable order.
    pub const ALL: [ProviderKey; 5] = [
        ProviderKey::Kubernetes,
        ProviderKey::CloudFoundry,
        ProviderKey::Aws,
        ProviderKey::Ecs,
        ProviderKey::DockerRegistry,
    ];

    /// Returns the document key for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKey::Kubernetes => "kubernetes",
            ProviderKey::CloudFoundry => "cloudfoundry",
            ProviderKey::Aws => "aws",
            ProviderKey::Ecs => "ecs",
            ProviderKey::DockerRegistry => "dockerRegistry",
        }
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKey {
    type Err = StratusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProviderKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StratusError::configuration("provider", format!("unknown provider '{s}'")))
    }
}
