use std::collections::HashMap;

use maplit::hashmap;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::secrets::PrivateKey;

pub const PRIVATE_KEY_1: &str = "PRIVATE_KEY_1";
pub const PRIVATE_KEY_2: &str = "PRIVATE_KEY_2";
pub const BSCSCAN_API_KEY: &str = "BSCSCAN_API_KEY";

/// Lookup of opaque secrets by environment variable name.
///
/// The runner resolves signing keys through this seam so tests can inject
/// fixed values instead of mutating the process environment.
pub trait SecretStore {
    fn get(&self, var: &str) -> Option<String>;
}

/// Reads secrets from the process environment.
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn get(&self, var: &str) -> Option<String> {
        std::env::var(var).ok()
    }
}

/// The full deployment configuration: network profiles, compiler settings,
/// explorer credentials and the ordered list of contracts to deploy.
///
/// Immutable once built; one value is constructed at startup and passed into
/// the runner, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_network_name")]
    pub default_network: String,

    pub networks: HashMap<String, NetworkProfile>,

    pub solidity: SolidityConfig,

    #[serde(default)]
    pub etherscan: EtherscanConfig,

    #[serde(default)]
    pub tenderly: TenderlyConfig,

    #[serde(default)]
    pub test_runner: TestRunnerConfig,

    #[serde(default = "Config::default_deployments")]
    pub deployments: Vec<DeploymentSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkProfile {
    pub url: String,

    #[serde(default)]
    pub chain_id: Option<u64>,

    /// Gas price in wei. Omitted profiles let the node estimate.
    #[serde(default)]
    pub gas_price: Option<u64>,

    /// Environment variable names holding the signing keys, in order.
    /// The first account pays for deployments.
    #[serde(default)]
    pub accounts: Vec<String>,

    /// RPC timeout in milliseconds, where the node client supports one.
    #[serde(default)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolidityConfig {
    pub compilers: Vec<CompilerVersion>,

    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerVersion {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "OptimizerConfig::default_runs")]
    pub runs: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EtherscanConfig {
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TenderlyConfig {
    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRunnerConfig {
    /// Per-test timeout in milliseconds.
    #[serde(default = "TestRunnerConfig::default_timeout")]
    pub timeout: u64,
}

/// One entry in the deployment sequence. Adding or removing a contract
/// deployment is a data change, not a code edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Compiled artifact name handed to the build system.
    pub contract: String,

    /// Human-readable label used in report output.
    pub label: String,

    #[serde(default)]
    pub constructor_args: Vec<String>,
}

impl Config {
    /// The built-in profile set matching the BSC deployment this tool ships
    /// for: a local development node, the BSC testnet and BSC mainnet.
    pub fn bsc_defaults() -> Self {
        Self {
            default_network: Self::default_network_name(),
            networks: hashmap! {
                "hardhat".to_string() => NetworkProfile {
                    url: "http://localhost:8545".to_string(),
                    chain_id: None,
                    gas_price: None,
                    accounts: vec![],
                    timeout: None,
                },
                "localhost".to_string() => NetworkProfile {
                    url: "http://localhost:8545".to_string(),
                    chain_id: None,
                    gas_price: None,
                    accounts: vec![],
                    timeout: Some(150_000),
                },
                "testnet".to_string() => NetworkProfile {
                    url: "https://data-seed-prebsc-1-s1.binance.org:8545"
                        .to_string(),
                    chain_id: Some(97),
                    gas_price: Some(20_000_000_000),
                    accounts: vec![
                        PRIVATE_KEY_1.to_string(),
                        PRIVATE_KEY_2.to_string(),
                    ],
                    timeout: None,
                },
                "mainnet".to_string() => NetworkProfile {
                    url: "https://bsc-dataseed.binance.org/".to_string(),
                    chain_id: Some(56),
                    gas_price: None,
                    accounts: vec![PRIVATE_KEY_1.to_string()],
                    timeout: None,
                },
            },
            solidity: SolidityConfig {
                compilers: vec![CompilerVersion {
                    version: "0.8.0".to_string(),
                }],
                optimizer: OptimizerConfig::default(),
            },
            etherscan: EtherscanConfig::default(),
            tenderly: TenderlyConfig::default(),
            test_runner: TestRunnerConfig::default(),
            deployments: Self::default_deployments(),
        }
    }

    /// The active network for a run: an explicit selection wins, otherwise
    /// the configuration's default applies.
    pub fn active_network<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(&self.default_network)
    }

    pub fn network(&self, name: &str) -> Result<&NetworkProfile, ConfigError> {
        self.networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string()))
    }

    fn default_network_name() -> String {
        "localhost".to_string()
    }

    fn default_deployments() -> Vec<DeploymentSpec> {
        vec![DeploymentSpec {
            contract: "CyberSpawns721".to_string(),
            label: "Cyber Spawns 721".to_string(),
            constructor_args: vec![],
        }]
    }
}

impl NetworkProfile {
    pub fn rpc_url(&self, network: &str) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|err| ConfigError::InvalidRpcUrl {
            network: network.to_string(),
            url: self.url.clone(),
            reason: err.to_string(),
        })
    }

    /// Resolves the profile's signing keys eagerly.
    ///
    /// Called before any network traffic so a missing or malformed secret
    /// fails the run deterministically instead of surfacing as an opaque
    /// signing error mid-deployment.
    pub fn signing_keys(
        &self,
        network: &str,
        secrets: &dyn SecretStore,
    ) -> Result<Vec<PrivateKey>, ConfigError> {
        self.accounts
            .iter()
            .map(|var| {
                let raw = secrets.get(var).ok_or_else(|| {
                    ConfigError::MissingSecret {
                        network: network.to_string(),
                        var: var.clone(),
                    }
                })?;

                raw.parse::<PrivateKey>().map_err(|err| {
                    ConfigError::InvalidSecret {
                        var: var.clone(),
                        reason: err.to_string(),
                    }
                })
            })
            .collect()
    }
}

impl SolidityConfig {
    pub fn version(&self) -> &str {
        self.compilers
            .first()
            .map(|compiler| compiler.version.as_str())
            .unwrap_or("unspecified")
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            runs: Self::default_runs(),
        }
    }
}

impl OptimizerConfig {
    fn default_runs() -> u32 {
        200
    }
}

impl Default for TestRunnerConfig {
    fn default() -> Self {
        Self {
            timeout: Self::default_timeout(),
        }
    }
}

impl TestRunnerConfig {
    fn default_timeout() -> u64 {
        50_000
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use indoc::indoc;

    use super::*;

    struct MapSecrets(HashMap<String, String>);

    impl SecretStore for MapSecrets {
        fn get(&self, var: &str) -> Option<String> {
            self.0.get(var).cloned()
        }
    }

    const KEY_HEX: &str =
        "0000000000000000000000000000000000000000000000000000000000000001";

    const OTHER_KEY_HEX: &str =
        "0000000000000000000000000000000000000000000000000000000000000002";

    #[test]
    fn bsc_defaults_match_the_shipped_networks() {
        let config = Config::bsc_defaults();

        assert_eq!(config.default_network, "localhost");

        let testnet = config.network("testnet").unwrap();
        assert_eq!(
            testnet.url,
            "https://data-seed-prebsc-1-s1.binance.org:8545"
        );
        assert_eq!(testnet.chain_id, Some(97));
        assert_eq!(testnet.gas_price, Some(20_000_000_000));
        assert_eq!(testnet.accounts, vec![PRIVATE_KEY_1, PRIVATE_KEY_2]);

        let mainnet = config.network("mainnet").unwrap();
        assert_eq!(mainnet.url, "https://bsc-dataseed.binance.org/");
        assert_eq!(mainnet.chain_id, Some(56));
        assert_eq!(mainnet.accounts, vec![PRIVATE_KEY_1]);

        let localhost = config.network("localhost").unwrap();
        assert_eq!(localhost.url, "http://localhost:8545");
        assert_eq!(localhost.timeout, Some(150_000));
        assert!(localhost.accounts.is_empty());

        assert_eq!(config.solidity.version(), "0.8.0");
        assert!(!config.solidity.optimizer.enabled);
        assert_eq!(config.solidity.optimizer.runs, 200);
        assert_eq!(config.test_runner.timeout, 50_000);

        assert_eq!(config.deployments.len(), 1);
        assert_eq!(config.deployments[0].contract, "CyberSpawns721");
        assert_eq!(config.deployments[0].label, "Cyber Spawns 721");
        assert!(config.deployments[0].constructor_args.is_empty());
    }

    #[test]
    fn parses_a_yaml_override_file() {
        let yaml = indoc! {r#"
            default_network: staging
            networks:
              staging:
                url: https://rpc.example.org
                chain_id: 1337
                accounts:
                  - STAGING_KEY
            solidity:
              compilers:
                - version: 0.8.17
              optimizer:
                enabled: true
                runs: 1000
            etherscan:
              api_key: abc123
            deployments:
              - contract: Splinters
                label: Cyber Spawns Splinters
              - contract: NanoDose
                label: Cyber Spawns Nano Dose
        "#};

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.default_network, "staging");

        let staging = config.network("staging").unwrap();
        assert_eq!(staging.chain_id, Some(1337));
        assert_eq!(staging.accounts, vec!["STAGING_KEY"]);
        assert_eq!(staging.gas_price, None);

        assert_eq!(config.solidity.version(), "0.8.17");
        assert!(config.solidity.optimizer.enabled);
        assert_eq!(config.solidity.optimizer.runs, 1000);
        assert_eq!(config.etherscan.api_key.as_deref(), Some("abc123"));

        // test-runner section omitted, default applies
        assert_eq!(config.test_runner.timeout, 50_000);

        let contracts: Vec<_> = config
            .deployments
            .iter()
            .map(|spec| spec.contract.as_str())
            .collect();
        assert_eq!(contracts, vec!["Splinters", "NanoDose"]);
    }

    #[test]
    fn config_file_default_network_applies_when_none_is_selected() {
        let yaml = indoc! {r#"
            default_network: staging
            networks:
              staging:
                url: https://rpc.example.org
            solidity:
              compilers:
                - version: 0.8.0
        "#};

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.active_network(None), "staging");
    }

    #[test]
    fn explicit_network_selection_wins_over_the_default() {
        let config = Config::bsc_defaults();

        assert_eq!(config.active_network(Some("mainnet")), "mainnet");
        assert_eq!(config.active_network(None), "localhost");
    }

    #[test]
    fn unknown_network_is_a_typed_error() {
        let config = Config::bsc_defaults();

        let err = config.network("ropsten").unwrap_err();

        assert!(
            matches!(err, ConfigError::UnknownNetwork(name) if name == "ropsten")
        );
    }

    #[test]
    fn missing_secret_is_reported_by_variable_name() {
        let config = Config::bsc_defaults();
        let secrets = MapSecrets(HashMap::new());

        let err = config
            .network("testnet")
            .unwrap()
            .signing_keys("testnet", &secrets)
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::MissingSecret { ref var, .. } if var == PRIVATE_KEY_1
        ));
    }

    #[test]
    fn malformed_secret_is_reported_by_variable_name() {
        let config = Config::bsc_defaults();
        let secrets = MapSecrets(HashMap::from([
            (PRIVATE_KEY_1.to_string(), "definitely-not-hex".to_string()),
            (PRIVATE_KEY_2.to_string(), KEY_HEX.to_string()),
        ]));

        let err = config
            .network("testnet")
            .unwrap()
            .signing_keys("testnet", &secrets)
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidSecret { ref var, .. } if var == PRIVATE_KEY_1
        ));
    }

    #[test]
    fn resolves_all_configured_signing_keys_in_order() {
        let config = Config::bsc_defaults();
        let secrets = MapSecrets(HashMap::from([
            (PRIVATE_KEY_1.to_string(), format!("0x{KEY_HEX}")),
            (PRIVATE_KEY_2.to_string(), OTHER_KEY_HEX.to_string()),
        ]));

        let keys = config
            .network("testnet")
            .unwrap()
            .signing_keys("testnet", &secrets)
            .unwrap();

        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].to_string(), KEY_HEX);
        assert_eq!(keys[1].to_string(), OTHER_KEY_HEX);
    }

    #[test]
    fn malformed_rpc_url_is_a_typed_error() {
        let profile = NetworkProfile {
            url: "not a url".to_string(),
            chain_id: None,
            gas_price: None,
            accounts: vec![],
            timeout: None,
        };

        let err = profile.rpc_url("broken").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidRpcUrl { ref network, .. } if network == "broken"
        ));
    }
}
