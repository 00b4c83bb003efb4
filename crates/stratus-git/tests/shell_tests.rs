use std::sync::Arc;

use stratus_git::{CycleOutcome, GitSyncConfig, GitSyncEngine, ShellTransport};

mod common;

#[tokio::test]
async fn test_shell_clone_and_pull_against_local_repo() {
    if !common::has_git() {
        eprintln!("git not available, skipping");
        return;
    }

    let origin = tempfile::tempdir().unwrap();
    common::init_origin(origin.path());

    let workspace = tempfile::tempdir().unwrap();
    let clone_dir = workspace.path().join("clone");
    let config = GitSyncConfig::builder()
        .repo(common::file_url(origin.path()))
        .branch("master")
        .local_clone_dir(&clone_dir)
        .build()
        .unwrap();

    let transport = Arc::new(ShellTransport::new(&config));
    let engine = GitSyncEngine::with_transport(config, transport);

    assert_eq!(engine.run_cycle().await.unwrap(), CycleOutcome::Cloned);
    assert!(clone_dir.join("kube-single.yml").exists());

    std::fs::write(origin.path().join("kube-single-2.yml"), "name: kube-2\n").unwrap();
    common::git(origin.path(), &["add", "."]);
    common::git(origin.path(), &["commit", "-q", "-m", "second account"]);

    assert_eq!(engine.run_cycle().await.unwrap(), CycleOutcome::Pulled);
    assert!(clone_dir.join("kube-single-2.yml").exists());
}

#[tokio::test]
async fn test_shell_pull_follows_moved_tag() {
    if !common::has_git() {
        eprintln!("git not available, skipping");
        return;
    }

    let origin = tempfile::tempdir().unwrap();
    common::init_origin(origin.path());
    common::git(origin.path(), &["tag", "v1"]);

    let workspace = tempfile::tempdir().unwrap();
    let clone_dir = workspace.path().join("clone");
    let config = GitSyncConfig::builder()
        .repo(common::file_url(origin.path()))
        .branch("refs/tags/v1")
        .local_clone_dir(&clone_dir)
        .build()
        .unwrap();

    let transport = Arc::new(ShellTransport::new(&config));
    let engine = GitSyncEngine::with_transport(config, transport);

    assert_eq!(engine.run_cycle().await.unwrap(), CycleOutcome::Cloned);
    assert!(clone_dir.join("kube-single.yml").exists());

    std::fs::write(origin.path().join("kube-single-2.yml"), "name: kube-2\n").unwrap();
    common::git(origin.path(), &["add", "."]);
    common::git(origin.path(), &["commit", "-q", "-m", "second account"]);

    // a detached tag checkout can't `git pull`, the tag is fetched instead
    assert_eq!(engine.run_cycle().await.unwrap(), CycleOutcome::Pulled);
    assert!(!clone_dir.join("kube-single-2.yml").exists());

    common::git(origin.path(), &["tag", "-f", "v1"]);
    assert_eq!(engine.run_cycle().await.unwrap(), CycleOutcome::Pulled);
    assert!(clone_dir.join("kube-single-2.yml").exists());
}

#[tokio::test]
async fn test_shell_clone_of_missing_branch_fails() {
    if !common::has_git() {
        eprintln!("git not available, skipping");
        return;
    }

    let origin = tempfile::tempdir().unwrap();
    common::init_origin(origin.path());

    let workspace = tempfile::tempdir().unwrap();
    let config = GitSyncConfig::builder()
        .repo(common::file_url(origin.path()))
        .branch("does-not-exist")
        .local_clone_dir(workspace.path().join("clone"))
        .build()
        .unwrap();

    let transport = Arc::new(ShellTransport::new(&config));
    let engine = GitSyncEngine::with_transport(config, transport);

    let err = engine.run_cycle().await.unwrap_err();
    assert!(err.to_string().contains("git clone --branch does-not-exist"));
    assert!(!engine.state().is_initialized());
}

#[tokio::test]
async fn test_git_available_matches_binary() {
    let available = stratus_git::git_available(std::time::Duration::from_secs(30)).await;
    assert_eq!(available, common::has_git());
}
