//! Periodic listing of every provider.

use std::future::Future;
use std::time::Duration;

use stratus_core::{
    AccountRecord, AwsAccount, CloudFoundryAccount, DockerRegistryAccount, EcsAccount, KubernetesAccount,
    ProviderKey,
};
use stratus_sources::CredentialIngestion;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// What one provider's source returned on a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReport {
    pub provider: ProviderKey,
    /// Account names, or the error that failed the poll.
    pub accounts: Result<Vec<String>, String>,
}

impl ProviderReport {
    fn log(&self) {
        match &self.accounts {
            Ok(names) if names.is_empty() => debug!("No {} accounts defined", self.provider),
            Ok(names) => info!("{} {} accounts: {}", names.len(), self.provider, names.join(", ")),
            Err(e) => warn!("Unable to list {} accounts: {}", self.provider, e),
        }
    }
}

async fn poll_provider<T: AccountRecord>(ingestion: &CredentialIngestion) -> ProviderReport {
    let accounts = match ingestion.source::<T>() {
        Ok(source) => source
            .list()
            .await
            .map(|accounts| accounts.iter().map(|a| a.name().to_string()).collect())
            .map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    ProviderReport {
        provider: T::PROVIDER,
        accounts,
    }
}

/// The git clone's condition at poll time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncHealth {
    pub healthy: bool,
    pub failures: u32,
    pub last_error: Option<String>,
    pub since_success: Option<Duration>,
}

impl SyncHealth {
    fn log(&self) {
        if self.healthy {
            debug!("Git sync healthy, last success {:?} ago", self.since_success.unwrap_or_default());
            return;
        }
        match (&self.last_error, self.since_success) {
            (Some(e), Some(since)) => warn!(
                "Git sync failing ({} in a row, last success {:?} ago): {}",
                self.failures, since, e
            ),
            (Some(e), None) => warn!("Git sync failing ({} in a row, never succeeded): {}", self.failures, e),
            (None, _) => info!("Waiting for the first git clone"),
        }
    }
}

/// Reads the git engine's state. `None` outside git mode.
pub fn sync_health(ingestion: &CredentialIngestion) -> Option<SyncHealth> {
    let state = ingestion.git_engine()?.state();
    Some(SyncHealth {
        healthy: state.is_healthy(),
        failures: state.failure_count(),
        last_error: state.last_error(),
        since_success: state.time_since_success(),
    })
}

/// Lists every provider once, in [`ProviderKey::ALL`] order.
pub async fn poll_once(ingestion: &CredentialIngestion) -> Vec<ProviderReport> {
    vec![
        poll_provider::<KubernetesAccount>(ingestion).await,
        poll_provider::<CloudFoundryAccount>(ingestion).await,
        poll_provider::<AwsAccount>(ingestion).await,
        poll_provider::<EcsAccount>(ingestion).await,
        poll_provider::<DockerRegistryAccount>(ingestion).await,
    ]
}

/// Polls every `every` until `shutdown` resolves. The first poll runs immediately.
pub async fn run<F>(ingestion: &CredentialIngestion, every: Duration, shutdown: F)
where
    F: Future<Output = ()>,
{
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(health) = sync_health(ingestion) {
                    health.log();
                }
                for report in poll_once(ingestion).await {
                    report.log();
                }
            }
            _ = &mut shutdown => {
                info!("Account polling stopped");
                break;
            }
        }
    }
}
