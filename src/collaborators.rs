//! Narrow seams around the external build, RPC and explorer collaborators.
//!
//! The production implementations shell out to `forge` (see `forge_utils`);
//! tests substitute in-memory fakes.

use ethers::types::Address;

use crate::error::DeployError;
use crate::secrets::PrivateKey;

/// The compiler/build collaborator. Resolves compiled artifacts by name.
pub trait BuildSystem {
    type Factory: ContractFactory;

    /// Fails with [`DeployError::ContractNotFound`] when no compiled
    /// artifact matches the requested name. No transaction is submitted
    /// in that case.
    async fn get_contract_factory(
        &self,
        contract: &str,
    ) -> Result<Self::Factory, DeployError>;
}

/// A deployable instance of a named compiled contract, bound to the active
/// network.
pub trait ContractFactory {
    type Pending: PendingDeployment;

    /// Submits the deployment transaction. The first signer pays for the
    /// deployment; an empty signer list means the node's default sender.
    async fn deploy(
        &self,
        signers: &[PrivateKey],
        constructor_args: &[String],
    ) -> Result<Self::Pending, DeployError>;
}

/// A submitted deployment awaiting on-chain inclusion.
pub trait PendingDeployment {
    /// Suspends until the network acknowledges inclusion, yielding the
    /// final contract address.
    async fn confirmed(self) -> Result<Address, DeployError>;
}

/// The block-explorer verification collaborator.
pub trait Verifier {
    async fn verify(
        &self,
        contract: &str,
        address: Address,
        constructor_args: &[String],
    ) -> Result<(), DeployError>;
}
