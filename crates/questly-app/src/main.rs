//! `questly` binary.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `questly-config.yaml` (defaults when missing)
//! 3. Initialize structured logging (tracing)
//! 4. Build the AI gateway (offline when no API key is configured)
//! 5. Open the store snapshot
//! 6. Run the command

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use questly_app::cli::{self, Cli};
use questly_app::config::AppConfig;
use questly_app::session::QuestSession;
use questly_gateway::Gateway;
use questly_store::MockStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let gateway_config = config
        .gateway_config()
        .context("invalid gateway configuration")?;
    let gateway =
        Gateway::from_config(gateway_config.as_ref()).context("failed to build AI gateway")?;
    info!(
        gateway = gateway.describe(),
        timeout_ms = config.llm.timeout_ms,
        "Gateway ready"
    );

    let store = match &config.store.path {
        Some(path) => MockStore::open(path)
            .await
            .with_context(|| format!("failed to open store at {}", path.display()))?,
        None => {
            info!("No store path configured, keeping data in memory");
            MockStore::in_memory()
        }
    };

    let mut session = QuestSession::load(store, gateway).await;
    cli::run(cli.command, &mut session, Utc::now()).await?;
    Ok(())
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist.
fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    AppConfig::load(path).with_context(|| format!("failed to load {}", path.display()))
}
