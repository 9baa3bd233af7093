use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::secrets::PrivateKey;

/// Builder for a `forge create` invocation.
///
/// The command is never logged wholesale because the argument list carries
/// the signing key.
#[derive(Debug)]
pub struct ForgeCreate {
    contract: String,
    rpc_url: Option<String>,
    private_key: Option<PrivateKey>,
    gas_price: Option<u64>,
    constructor_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeOutput {
    pub deployer: Address,
    pub deployed_to: Address,
    pub transaction_hash: H256,
}

impl ForgeCreate {
    pub fn new(contract: impl ToString) -> Self {
        Self {
            contract: contract.to_string(),
            rpc_url: None,
            private_key: None,
            gas_price: None,
            constructor_args: vec![],
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: String) -> Self {
        self.rpc_url = Some(rpc_url);
        self
    }

    pub fn with_private_key(mut self, private_key: PrivateKey) -> Self {
        self.private_key = Some(private_key);
        self
    }

    pub fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn with_constructor_arg(mut self, arg: impl ToString) -> Self {
        self.constructor_args.push(arg.to_string());
        self
    }

    #[instrument(name = "forge_create", skip_all, fields(contract = %self.contract))]
    pub async fn run(&self) -> eyre::Result<ForgeOutput> {
        let mut cmd = tokio::process::Command::new("forge");
        cmd.arg("create");

        cmd.arg(&self.contract);

        if let Some(private_key) = &self.private_key {
            cmd.arg("--private-key");
            cmd.arg(private_key.to_string());
        }

        if let Some(rpc_url) = &self.rpc_url {
            cmd.arg("--rpc-url");
            cmd.arg(rpc_url);
        }

        if let Some(gas_price) = self.gas_price {
            cmd.arg("--gas-price");
            cmd.arg(gas_price.to_string());
        }

        for constructor_arg in &self.constructor_args {
            cmd.arg("--constructor-args");
            cmd.arg(constructor_arg);
        }

        cmd.arg("--json");

        info!("Deploying {}", self.contract);

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge create failed: {}", stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let output = serde_json::from_str(strip_non_json(&stdout))?;

        info!("Created: {output:?}");

        Ok(output)
    }
}

// forge occasionally prints warnings after the JSON payload
fn strip_non_json(s: &str) -> &str {
    if let Some(last_closing_brace) = s.rfind('}') {
        &s[..=last_closing_brace]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forge_json_output() {
        let stdout = r#"{
            "deployer": "0x00000000000000000000000000000000000000aa",
            "deployedTo": "0x00000000000000000000000000000000000000bb",
            "transactionHash": "0x1111111111111111111111111111111111111111111111111111111111111111"
        }"#;

        let output: ForgeOutput = serde_json::from_str(stdout).unwrap();

        assert_eq!(
            output.deployer,
            "0x00000000000000000000000000000000000000aa"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(
            output.deployed_to,
            "0x00000000000000000000000000000000000000bb"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn strips_trailing_noise_after_the_json_payload() {
        let stdout = "{\"a\": 1}\nWarning: something unrelated\n";

        assert_eq!(strip_non_json(stdout), "{\"a\": 1}");
    }

    #[test]
    fn leaves_json_free_output_untouched() {
        assert_eq!(strip_non_json("no json here"), "no json here");
    }
}
