use std::path::PathBuf;

use clap::Parser;

/// Deploys the Cyber Spawns contracts and registers them with BscScan.
#[derive(Debug, Clone, Parser)]
#[clap(rename_all = "kebab-case")]
pub struct Args {
    /// Name of the network profile to deploy to
    ///
    /// Defaults to the configuration's `default_network` when omitted.
    #[clap(short, long, env = "NETWORK")]
    pub network: Option<String>,

    /// Path to a YAML deployment configuration file
    ///
    /// Falls back to the built-in BSC configuration when omitted.
    #[clap(short, long, env)]
    pub config: Option<PathBuf>,

    /// Restrict the run to a single named contract from the deployment list
    #[clap(long, env)]
    pub contract: Option<String>,

    /// The BscScan API key to use for source verification
    #[clap(short, long, env = "BSCSCAN_API_KEY")]
    pub etherscan_api_key: Option<String>,

    /// Tenderly project the deployment belongs to
    ///
    /// Recorded for operator reference only; no Tenderly call is made.
    #[clap(long, env = "TENDERLY_PROJECT")]
    pub tenderly_project: Option<String>,

    /// Tenderly username owning the project
    ///
    /// Recorded for operator reference only; no Tenderly call is made.
    #[clap(long, env = "TENDERLY_USERNAME")]
    pub tenderly_username: Option<String>,
}
