use clap::Parser;
use tracing::debug;
use tracing_error::ErrorLayer;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::cli::Args;
use crate::config::{Config, EnvSecrets};
use crate::forge_utils::ForgeSystem;

pub mod forge_utils;
pub mod serde_utils;

mod cli;
mod collaborators;
mod config;
mod deployment;
mod error;
mod secrets;

async fn start() -> eyre::Result<()> {
    let cmd = Args::parse();

    let mut config: Config = match &cmd.config {
        Some(path) => serde_utils::read_deserialize(path).await?,
        None => Config::bsc_defaults(),
    };

    // Fold the flag/env API key into the config before the runner's
    // pre-flight checks see it.
    if let Some(key) = cmd.etherscan_api_key.clone() {
        config.etherscan.api_key = Some(key);
    }

    let tenderly_project =
        cmd.tenderly_project.clone().or(config.tenderly.project.clone());
    let tenderly_username =
        cmd.tenderly_username.clone().or(config.tenderly.username.clone());

    debug!(
        solidity = config.solidity.version(),
        optimizer = config.solidity.optimizer.enabled,
        optimizer_runs = config.solidity.optimizer.runs,
        test_timeout_ms = config.test_runner.timeout,
        tenderly_project = ?tenderly_project,
        tenderly_username = ?tenderly_username,
        "Loaded deployment configuration"
    );

    let network_name =
        config.active_network(cmd.network.as_deref()).to_string();
    let profile = config.network(&network_name)?;

    let system = ForgeSystem::new(
        &network_name,
        profile,
        config.etherscan.api_key.clone(),
    )?;

    let results = deployment::run_deployment(
        &config,
        &network_name,
        cmd.contract.as_deref(),
        &EnvSecrets,
        &system,
    )
    .await?;

    tracing::info!(
        deployed = results.len(),
        network = %network_name,
        "Deployment run complete"
    );

    Ok(())
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    dotenv::dotenv().ok();

    let indicatif_layer = IndicatifLayer::new();

    let filter = EnvFilter::from_default_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(indicatif_layer.get_stderr_writer())
                .with_filter(filter),
        )
        .with(indicatif_layer)
        .with(ErrorLayer::default())
        .init();

    match start().await {
        Ok(()) => Ok(()),
        Err(err) => {
            let report = eyre::ErrReport::from(err);
            tracing::error!("{:?}", report);
            std::process::exit(1)
        }
    }
}
