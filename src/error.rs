use ethers::types::Address;
use thiserror::Error;

/// Problems detected while resolving configuration, before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no network profile named {0:?} is configured")]
    UnknownNetwork(String),

    #[error("network {network:?} has a malformed RPC url {url:?}: {reason}")]
    InvalidRpcUrl {
        network: String,
        url: String,
        reason: String,
    },

    #[error("network {network:?} requires the {var} environment variable, which is not set")]
    MissingSecret { network: String, var: String },

    #[error("network {network:?} requires source verification but has no chain id configured")]
    MissingChainId { network: String },

    #[error("environment variable {var} does not contain a valid private key: {reason}")]
    InvalidSecret { var: String, reason: String },
}

/// The error union returned by the deployment runner.
///
/// The runner never touches the process lifecycle itself; the binary entry
/// point maps any of these to a logged report and a non-zero exit code.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("configuration incomplete: {0}")]
    ConfigurationIncomplete(#[from] ConfigError),

    #[error("no compiled artifact matches contract {0:?}")]
    ContractNotFound(String),

    #[error("build system unavailable: {0}")]
    BuildSystemUnavailable(String),

    #[error("deployment submission failed: {0}")]
    SubmissionFailed(String),

    #[error("source verification failed for {address:?}: {reason}")]
    VerificationFailed { address: Address, reason: String },
}
