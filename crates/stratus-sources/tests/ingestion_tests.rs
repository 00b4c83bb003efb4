//! Ingestion façade integration tests.

mod common;

use std::sync::Arc;

use common::{FakeTransport, git_config, names, write};
use stratus_core::{CloudFoundryAccount, KubernetesAccount, ValueResolver};
use stratus_git::GitSyncEngine;
use stratus_sources::{AccountSource, CredentialIngestion, FilePrefixes, SourceConfig};

#[tokio::test]
async fn test_directory_mode() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "kube-single.yml", "kubernetes:\n  accounts:\n    - name: kube-1\n");
    write(dir.path(), "cf-single.yml", "name: cf-1\napi: api.cf.example.com\n");

    let source = SourceConfig::Directory {
        path: dir.path().to_path_buf(),
        prefixes: FilePrefixes::default(),
    };
    let ingestion = CredentialIngestion::new(source, ValueResolver::default()).await.unwrap();

    assert!(ingestion.git_engine().is_none());
    assert!(ingestion.start().is_none());

    let kube = ingestion.source::<KubernetesAccount>().unwrap();
    assert_eq!(names(&kube.list().await.unwrap()), vec!["kube-1"]);
}

#[tokio::test]
async fn test_git_source_is_empty_until_cloned() {
    let dir = tempfile::tempdir().unwrap();
    let clone_dir = dir.path().join("clone");

    let engine = Arc::new(GitSyncEngine::with_transport(
        git_config(&clone_dir),
        Arc::new(FakeTransport::default()),
    ));
    let ingestion = CredentialIngestion::from_engine(Arc::clone(&engine), FilePrefixes::default(), ValueResolver::default());

    let kube = ingestion.source::<KubernetesAccount>().unwrap();
    assert!(kube.list().await.unwrap().is_empty());

    engine.run_cycle().await.unwrap();
    assert_eq!(names(&kube.list().await.unwrap()), vec!["kube-1"]);

    let cf = ingestion.source::<CloudFoundryAccount>().unwrap();
    assert!(cf.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_url_fails_source_creation() {
    let source = SourceConfig::Url {
        url: "::not a url::".to_string(),
        format: stratus_core::AccountFormat::Yaml,
    };
    let ingestion = CredentialIngestion::new(source, ValueResolver::default()).await.unwrap();

    let err = ingestion.source::<KubernetesAccount>().err().unwrap();
    assert!(err.is_configuration_error());
}
