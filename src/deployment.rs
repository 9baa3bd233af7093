use std::fmt;

use ethers::types::Address;
use tracing::{debug, info, instrument};

use crate::collaborators::{
    BuildSystem, ContractFactory, PendingDeployment, Verifier,
};
use crate::config::{Config, DeploymentSpec, SecretStore, BSCSCAN_API_KEY};
use crate::error::{ConfigError, DeployError};

/// Networks whose deployments are registered with the block explorer.
/// Every other network gets a manual-verification reminder instead.
pub const VERIFIED_NETWORKS: [&str; 2] = ["mainnet", "testnet"];

pub fn requires_verification(network: &str) -> bool {
    VERIFIED_NETWORKS.contains(&network)
}

/// Produced once per contract, only after on-chain confirmation. Printed to
/// stdout and returned to the caller; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    /// Human-readable contract label from the deployment spec.
    pub contract: String,
    pub address: Address,
    pub network: String,
}

impl fmt::Display for DeploymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Address renders via Debug to get the full untruncated hex
        write!(f, "{} contract Deployed: {:?}", self.contract, self.address)
    }
}

pub fn manual_verification_reminder(network: &str) -> String {
    format!("Contracts deployed to {network} network. Please verify them manually.")
}

/// Runs the configured deployment sequence against one network profile.
///
/// Per contract the sequence is strictly linear: resolve the factory, submit,
/// await confirmation, then verify (public networks) or remind (everything
/// else). Nothing is retried; the first failure aborts the run, including a
/// verification failure after a successful deployment.
///
/// Process lifecycle stays with the caller: this returns the typed
/// [`DeployError`] union and never exits.
#[instrument(skip_all, fields(network = network_name))]
pub async fn run_deployment<S>(
    config: &Config,
    network_name: &str,
    only_contract: Option<&str>,
    secrets: &dyn SecretStore,
    system: &S,
) -> Result<Vec<DeploymentResult>, DeployError>
where
    S: BuildSystem + Verifier,
{
    let profile = config.network(network_name)?;

    // Missing or malformed secrets abort here, before any network call.
    let signers = profile.signing_keys(network_name, secrets)?;

    // Verification prerequisites are checked up front too: a deployment is
    // irreversible, so a missing explorer credential must not surface only
    // after the transaction has been submitted.
    if requires_verification(network_name) {
        if profile.chain_id.is_none() {
            return Err(ConfigError::MissingChainId {
                network: network_name.to_string(),
            }
            .into());
        }

        if config.etherscan.api_key.is_none() {
            return Err(ConfigError::MissingSecret {
                network: network_name.to_string(),
                var: BSCSCAN_API_KEY.to_string(),
            }
            .into());
        }
    }

    debug!(
        accounts = signers.len(),
        timeout = ?profile.timeout,
        "Resolved network profile"
    );

    let specs: Vec<&DeploymentSpec> = match only_contract {
        Some(name) => {
            let spec = config
                .deployments
                .iter()
                .find(|spec| spec.contract == name)
                .ok_or_else(|| DeployError::ContractNotFound(name.to_string()))?;

            vec![spec]
        }
        None => config.deployments.iter().collect(),
    };

    let mut results = Vec::with_capacity(specs.len());

    for spec in specs {
        let factory = system.get_contract_factory(&spec.contract).await?;

        let pending = factory.deploy(&signers, &spec.constructor_args).await?;

        let address = pending.confirmed().await?;

        let result = DeploymentResult {
            contract: spec.label.clone(),
            address,
            network: network_name.to_string(),
        };

        println!("{result}");
        info!(contract = %spec.contract, address = ?address, "Deployment confirmed");

        if requires_verification(network_name) {
            system
                .verify(&spec.contract, address, &spec.constructor_args)
                .await?;

            info!(contract = %spec.contract, "Source verification submitted");
        } else {
            println!("{}", manual_verification_reminder(network_name));
        }

        results.push(result);
    }

    Ok(results)
}
