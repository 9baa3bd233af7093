use thiserror::Error;
use tracing::instrument;

/// Why a `forge inspect` probe failed. A clean non-zero exit means forge ran
/// and found no matching artifact; the other variants mean the build system
/// itself is unusable.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to invoke forge: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("forge inspect failed: {0}")]
    CommandFailed(String),

    #[error("unreadable forge inspect output: {0}")]
    BadOutput(#[from] serde_json::Error),
}

/// `forge inspect` probe. Used to confirm a compiled artifact exists (and
/// fetch its ABI) before any transaction is submitted.
pub struct ForgeInspect {
    contract: String,
}

impl ForgeInspect {
    pub fn new(contract: impl ToString) -> Self {
        Self {
            contract: contract.to_string(),
        }
    }

    #[instrument(name = "forge_inspect", skip_all, fields(contract = %self.contract))]
    pub async fn run(&self) -> Result<ethers::abi::Abi, InspectError> {
        let mut cmd = tokio::process::Command::new("forge");

        cmd.arg("inspect");
        cmd.arg(&self.contract);
        cmd.arg("abi");

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InspectError::CommandFailed(
                stderr.trim().to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        Ok(serde_json::from_str(&stdout)?)
    }
}
