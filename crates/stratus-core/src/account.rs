//! Account record types.
//!
//! The ingestion pipeline is generic over [`AccountRecord`]: anything that
//! can be deserialized from a generic document tree, has a `name`, and knows
//! which provider section it lives under. The provider schemas below keep a
//! handful of well-known fields typed and carry every other field in an
//! ordered `properties` map, so no definition is lost in transit.

use std::fmt::Debug;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ProviderKey;

/// A typed credential definition for one cloud account.
pub trait AccountRecord: DeserializeOwned + Debug + Send + Sync + 'static {
    /// The provider section this record type is read from.
    const PROVIDER: ProviderKey;

    /// Returns the account name.
    fn name(&self) -> &str;
}

/// Opaque fields that are not modelled explicitly.
pub type Properties = IndexMap<String, Value>;

/// A Kubernetes account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_file: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub omit_namespaces: Vec<String>,
    #[serde(flatten)]
    pub properties: Properties,
}

/// A Cloud Foundry account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFoundryAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apps_manager_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default)]
    pub skip_ssl_validation: bool,
    #[serde(flatten)]
    pub properties: Properties,
}

/// An AWS account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<AwsRegion>,
    #[serde(flatten)]
    pub properties: Properties,
}

/// A region enabled for an [`AwsAccount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsRegion {
    pub name: String,
}

/// An ECS account, which piggybacks on an AWS account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcsAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_account: Option<String>,
    #[serde(flatten)]
    pub properties: Properties,
}

/// A Docker registry account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerRegistryAccount {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default = "default_cache_interval_seconds")]
    pub cache_interval_seconds: u64,
    #[serde(default = "default_client_timeout_millis")]
    pub client_timeout_millis: u64,
    #[serde(default = "default_cache_threads")]
    pub cache_threads: u32,
    #[serde(default = "default_paginate_size")]
    pub paginate_size: u32,
    #[serde(default)]
    pub sort_tags_by_date: bool,
    #[serde(default)]
    pub track_digests: bool,
    #[serde(default)]
    pub insecure_registry: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<String>,
    #[serde(flatten)]
    pub properties: Properties,
}

fn default_cache_interval_seconds() -> u64 {
    30
}

fn default_client_timeout_millis() -> u64 {
    60_000
}

fn default_cache_threads() -> u32 {
    1
}

fn default_paginate_size() -> u32 {
    100
}

macro_rules! impl_account_record {
    ($($ty:ty => $provider:expr),+ $(,)?) => {
        $(
            impl AccountRecord for $ty {
                const PROVIDER: ProviderKey = $provider;

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )+
    };
}

impl_account_record! {
    KubernetesAccount => ProviderKey::Kubernetes,
    CloudFoundryAccount => ProviderKey::CloudFoundry,
    AwsAccount => ProviderKey::Aws,
    EcsAccount => ProviderKey::Ecs,
    DockerRegistryAccount => ProviderKey::DockerRegistry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_fields_are_kept() {
        let account: KubernetesAccount = serde_json::from_value(json!({
            "name": "kube-1",
            "context": "prod",
            "cacheThreads": 4,
            "permissions": {"READ": ["devs"]}
        }))
        .unwrap();

        assert_eq!(account.name(), "kube-1");
        assert_eq!(account.context.as_deref(), Some("prod"));
        assert_eq!(account.properties.get("cacheThreads"), Some(&json!(4)));
        assert!(account.properties.contains_key("permissions"));
    }

    #[test]
    fn test_docker_registry_defaults() {
        let account: DockerRegistryAccount =
            serde_json::from_value(json!({"name": "dockerhub"})).unwrap();

        assert_eq!(account.cache_interval_seconds, 30);
        assert_eq!(account.client_timeout_millis, 60_000);
        assert_eq!(account.cache_threads, 1);
        assert_eq!(account.paginate_size, 100);
        assert!(!account.insecure_registry);
        assert!(account.repositories.is_empty());
    }

    #[test]
    fn test_missing_name_fails() {
        let result = serde_json::from_value::<AwsAccount>(json!({"accountId": "123"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_constants() {
        assert_eq!(KubernetesAccount::PROVIDER, ProviderKey::Kubernetes);
        assert_eq!(CloudFoundryAccount::PROVIDER, ProviderKey::CloudFoundry);
        assert_eq!(AwsAccount::PROVIDER, ProviderKey::Aws);
        assert_eq!(EcsAccount::PROVIDER, ProviderKey::Ecs);
        assert_eq!(DockerRegistryAccount::PROVIDER, ProviderKey::DockerRegistry);
    }
}
