#![allow(dead_code)]
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use stratus_core::{AccountRecord, ValueResolver};
use stratus_git::{GitSyncConfig, GitSyncError, GitTransport};
use stratus_sources::DirectorySource;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Writes `content` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    std::fs::write(path, content).expect("Failed to write fixture");
}

/// Builds a directory source accepting the given prefixes.
pub fn dir_source<T: AccountRecord>(dir: &Path, prefixes: &[&str]) -> DirectorySource<T> {
    DirectorySource::new(
        dir,
        prefixes.iter().map(|p| p.to_string()).collect(),
        ValueResolver::default(),
    )
}

/// Returns the sorted names of `accounts`.
pub fn names<T: AccountRecord>(accounts: &[T]) -> Vec<String> {
    let mut names: Vec<String> = accounts.iter().map(|a| a.name().to_string()).collect();
    names.sort();
    names
}

/// A transport that copies one account file into the clone directory.
#[derive(Default)]
pub struct FakeTransport {
    pub clones: AtomicUsize,
}

#[async_trait]
impl GitTransport for FakeTransport {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn clone_repo(&self, target: &Path) -> Result<(), GitSyncError> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        std::fs::write(
            target.join("kube-single.yml"),
            "kubernetes:\n  accounts:\n    - name: kube-1\n",
        )?;
        Ok(())
    }

    async fn pull_changes(&self, _target: &Path) -> Result<(), GitSyncError> {
        Ok(())
    }
}

/// Builds a config cloning into `dir`.
pub fn git_config(dir: &Path) -> GitSyncConfig {
    GitSyncConfig::builder()
        .repo("https://git.example.com/org/accounts.git")
        .local_clone_dir(dir)
        .build()
        .expect("Failed to build test config")
}

/// Serves one canned HTTP response per connection and returns the base URL.
pub async fn serve(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    format!("http://{}", addr)
}
