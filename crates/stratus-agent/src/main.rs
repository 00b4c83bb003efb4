//! Stratus agent binary.

use anyhow::Context;
use stratus_core::ValueResolver;
use stratus_sources::{CredentialIngestion, IngestionSettings};
use stratus_agent::{AgentOptions, run, shutdown_signal};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = AgentOptions::from_env()?;

    tracing::info!("Starting Stratus agent v{}", env!("CARGO_PKG_VERSION"));
    match &options.config_path {
        Some(path) => tracing::info!("Settings file: {}", path.display()),
        None => tracing::info!("No settings file, reading STRATUS__* environment variables only"),
    }

    let source = IngestionSettings::load(options.config_path.as_deref())
        .and_then(|settings| settings.validate())
        .context("Invalid ingestion settings")?;

    let ingestion = CredentialIngestion::new(source, ValueResolver::default())
        .await
        .context("Failed to initialize account ingestion")?;

    if let Some(engine) = ingestion.git_engine() {
        tracing::info!("Git sync using {} transport", engine.transport_name());
    }

    // Dropping the handle stops the scheduler
    let _sync = ingestion.start();

    run(&ingestion, options.poll_interval, shutdown_signal()).await;

    Ok(())
}
