//! Builder-style wrappers around the `forge` executable plus the production
//! collaborator set built on top of them. `forge` fronts all three external
//! services: the compiled artifact store, the RPC network client and the
//! explorer verification API.

use ethers::types::Address;

use crate::collaborators::{
    BuildSystem, ContractFactory, PendingDeployment, Verifier,
};
use crate::config::NetworkProfile;
use crate::error::{ConfigError, DeployError};
use crate::secrets::PrivateKey;

pub mod create;
pub mod inspect;
pub mod verify;

pub use create::{ForgeCreate, ForgeOutput};
pub use inspect::{ForgeInspect, InspectError};
pub use verify::ForgeVerify;

/// Production collaborator set backed by the `forge` CLI.
pub struct ForgeSystem {
    network: String,
    rpc_url: String,
    chain_id: Option<u64>,
    gas_price: Option<u64>,
    etherscan_api_key: Option<String>,
}

impl ForgeSystem {
    /// Binds the system to one network profile. The RPC url is parsed here
    /// so a malformed literal fails at startup, not mid-deployment.
    pub fn new(
        network: &str,
        profile: &NetworkProfile,
        etherscan_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let rpc_url = profile.rpc_url(network)?;

        Ok(Self {
            network: network.to_string(),
            rpc_url: rpc_url.to_string(),
            chain_id: profile.chain_id,
            gas_price: profile.gas_price,
            etherscan_api_key,
        })
    }
}

impl BuildSystem for ForgeSystem {
    type Factory = ForgeFactory;

    async fn get_contract_factory(
        &self,
        contract: &str,
    ) -> Result<ForgeFactory, DeployError> {
        // Probe the artifact before anything touches the network.
        ForgeInspect::new(contract)
            .run()
            .await
            .map_err(|err| contract_factory_error(contract, err))?;

        Ok(ForgeFactory {
            contract: contract.to_string(),
            rpc_url: self.rpc_url.clone(),
            gas_price: self.gas_price,
        })
    }
}

/// A named artifact bound to the active network, ready to deploy.
pub struct ForgeFactory {
    contract: String,
    rpc_url: String,
    gas_price: Option<u64>,
}

impl ContractFactory for ForgeFactory {
    type Pending = ForgeDeployment;

    async fn deploy(
        &self,
        signers: &[PrivateKey],
        constructor_args: &[String],
    ) -> Result<ForgeDeployment, DeployError> {
        let mut create = ForgeCreate::new(&self.contract)
            .with_rpc_url(self.rpc_url.clone());

        // The first configured account pays for the deployment; profiles
        // without accounts fall back to the node's default sender.
        if let Some(key) = signers.first() {
            create = create.with_private_key(key.clone());
        }

        if let Some(gas_price) = self.gas_price {
            create = create.with_gas_price(gas_price);
        }

        for arg in constructor_args {
            create = create.with_constructor_arg(arg);
        }

        let output = create
            .run()
            .await
            .map_err(|err| DeployError::SubmissionFailed(err.to_string()))?;

        Ok(ForgeDeployment { output })
    }
}

/// `forge create` only returns once the transaction is mined, so the pending
/// handle resolves immediately from its captured output.
pub struct ForgeDeployment {
    output: ForgeOutput,
}

impl PendingDeployment for ForgeDeployment {
    async fn confirmed(self) -> Result<Address, DeployError> {
        Ok(self.output.deployed_to)
    }
}

/// A failed probe only means "no such artifact" when forge itself ran and
/// said so; anything else is the build system being unusable.
fn contract_factory_error(contract: &str, err: InspectError) -> DeployError {
    match err {
        InspectError::CommandFailed(_) => {
            DeployError::ContractNotFound(contract.to_string())
        }
        other => DeployError::BuildSystemUnavailable(other.to_string()),
    }
}

impl Verifier for ForgeSystem {
    async fn verify(
        &self,
        contract: &str,
        address: Address,
        constructor_args: &[String],
    ) -> Result<(), DeployError> {
        let chain = self.chain_id.ok_or_else(|| {
            DeployError::VerificationFailed {
                address,
                reason: format!(
                    "network {} has no chain id configured",
                    self.network
                ),
            }
        })?;

        let api_key = self.etherscan_api_key.as_deref().ok_or_else(|| {
            DeployError::VerificationFailed {
                address,
                reason: "no explorer API key configured".to_string(),
            }
        })?;

        let mut verify = ForgeVerify::new(contract, address)
            .with_chain(chain)
            .with_etherscan_api_key(api_key);

        for arg in constructor_args {
            verify = verify.with_constructor_arg(arg);
        }

        verify.run().await.map_err(|err| {
            DeployError::VerificationFailed {
                address,
                reason: err.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_probe_means_artifact_missing() {
        let err = contract_factory_error(
            "CyberSpawns721",
            InspectError::CommandFailed("no matching artifact".to_string()),
        );

        assert!(matches!(
            err,
            DeployError::ContractNotFound(name) if name == "CyberSpawns721"
        ));
    }

    #[test]
    fn unavailable_forge_is_not_reported_as_a_missing_artifact() {
        let io = std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "No such file or directory",
        );

        let err =
            contract_factory_error("CyberSpawns721", InspectError::Spawn(io));

        assert!(matches!(err, DeployError::BuildSystemUnavailable(_)));
    }
}
