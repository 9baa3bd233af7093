use ethers::types::Address;
use eyre::ContextCompat;
use tracing::{info, instrument};

/// Builder for a `forge verify-contract` invocation against the explorer's
/// verification API.
pub struct ForgeVerify {
    contract: String,
    address: Address,
    chain: Option<u64>,
    etherscan_api_key: Option<String>,
    constructor_args: Vec<String>,
}

impl ForgeVerify {
    pub fn new(contract: impl ToString, address: Address) -> Self {
        Self {
            contract: contract.to_string(),
            address,
            chain: None,
            etherscan_api_key: None,
            constructor_args: vec![],
        }
    }

    pub fn with_chain(mut self, chain: u64) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn with_etherscan_api_key(
        mut self,
        etherscan_api_key: impl ToString,
    ) -> Self {
        self.etherscan_api_key = Some(etherscan_api_key.to_string());
        self
    }

    /// ABI-encoded constructor argument blob, passed through as given.
    pub fn with_constructor_arg(mut self, arg: impl ToString) -> Self {
        self.constructor_args.push(arg.to_string());
        self
    }

    #[instrument(name = "forge_verify", skip_all, fields(contract = %self.contract))]
    pub async fn run(&self) -> eyre::Result<()> {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.arg("verify-contract");

        cmd.arg("--watch");

        let chain = self.chain.context("Missing chain")?;

        cmd.arg("--chain");
        cmd.arg(chain.to_string());

        let etherscan_api_key = self
            .etherscan_api_key
            .as_ref()
            .context("Missing etherscan api key")?;

        cmd.arg("--etherscan-api-key");
        cmd.arg(etherscan_api_key);

        for constructor_arg in &self.constructor_args {
            cmd.arg("--constructor-args");
            cmd.arg(constructor_arg);
        }

        cmd.arg(format!("{:?}", self.address));
        cmd.arg(&self.contract);

        info!("Verifying {} at {:?}", self.contract, self.address);

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge verify failed: {}", stderr);
        }

        Ok(())
    }
}
