#![allow(dead_code)]
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use stratus_git::{GitSyncConfig, GitSyncError, GitTransport};

/// A transport that writes files instead of talking to a remote.
#[derive(Default)]
pub struct FakeTransport {
    pub clones: AtomicUsize,
    pub pulls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeTransport {
    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    pub fn pulls(&self) -> usize {
        self.pulls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl GitTransport for FakeTransport {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn clone_repo(&self, target: &Path) -> Result<(), GitSyncError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GitSyncError::gix("remote unreachable"));
        }
        self.clones.fetch_add(1, Ordering::SeqCst);
        std::fs::write(target.join("kube-accounts.yml"), "name: kube-1\n")?;
        Ok(())
    }

    async fn pull_changes(&self, _target: &Path) -> Result<(), GitSyncError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GitSyncError::gix("remote unreachable"));
        }
        self.pulls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Builds a config cloning into `dir`.
pub fn config_for(dir: &Path) -> GitSyncConfig {
    GitSyncConfig::builder()
        .repo("https://git.example.com/org/accounts.git")
        .local_clone_dir(dir)
        .build()
        .expect("Failed to build test config")
}

/// Returns true if a usable `git` binary is on the PATH.
pub fn has_git() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs git in `dir`, panicking on failure (intended for tests).
pub fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args([
            "-c",
            "user.name=Stratus Test",
            "-c",
            "user.email=test@stratus.invalid",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        status.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&status.stderr)
    );
}

/// Creates a repository on branch `master` with one account file.
pub fn init_origin(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["symbolic-ref", "HEAD", "refs/heads/master"]);
    std::fs::write(
        dir.join("kube-single.yml"),
        "kubernetes:\n  accounts:\n    - name: kube-1\n",
    )
    .expect("Failed to write account file");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", "initial accounts"]);
}

/// Returns `dir` as a `file://` URL.
pub fn file_url(dir: &Path) -> String {
    format!("file://{}", dir.display())
}
