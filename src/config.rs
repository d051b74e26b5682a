// Network and compiler configuration
//
// Named network endpoints plus global solc optimizer settings, loaded once
// at startup and read-only afterwards.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use ethers::types::Address;
use serde::{Deserialize, Serialize};

/// Environment variable naming the account deployments are sent from
pub const CREATOR_ACCOUNT_VAR: &str = "CREATOR_ACCOUNT";

/// A single named network endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Network id the node is expected to report
    pub network_id: u64,

    /// RPC host
    pub host: String,

    /// RPC port
    pub port: u16,

    /// Default gas ceiling for transactions on this network
    pub gas: u64,

    /// Sender account; falls back to CREATOR_ACCOUNT when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
}

impl NetworkConfig {
    /// HTTP JSON-RPC endpoint for this network
    pub fn rpc_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Resolve the sender account from the config or the environment
    pub fn sender(&self) -> Result<Address> {
        if let Some(from) = self.from {
            return Ok(from);
        }
        let raw = env::var(CREATOR_ACCOUNT_VAR).map_err(|_| {
            anyhow!(
                "{} environment variable not set and no `from` account configured",
                CREATOR_ACCOUNT_VAR
            )
        })?;
        Address::from_str(raw.trim())
            .map_err(|_| anyhow!("{} is not a valid address: {}", CREATOR_ACCOUNT_VAR, raw))
    }
}

/// Solc optimizer flags passed through to the compiler tooling
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimizerSettings {
    pub enabled: bool,
    pub runs: u32,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            runs: 200,
        }
    }
}

/// Compiler settings consumed by the external build tooling
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CompilerSettings {
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

/// Full deployment configuration: named networks plus compiler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Map of network name to endpoint configuration
    pub networks: HashMap<String, NetworkConfig>,

    /// Compiler settings shared by all networks
    #[serde(default)]
    pub compiler: CompilerSettings,
}

impl DeployConfig {
    /// Look up a network by name
    pub fn network(&self, name: &str) -> Result<&NetworkConfig> {
        self.networks
            .get(name)
            .ok_or_else(|| anyhow!("unknown network: {}", name))
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        let mut networks = HashMap::new();
        networks.insert(
            "classic".to_string(),
            NetworkConfig {
                network_id: 1,
                host: "localhost".to_string(),
                port: 8545,
                gas: 2_000_000,
                from: None,
            },
        );
        Self {
            networks,
            compiler: CompilerSettings::default(),
        }
    }
}

/// Configuration manager for the deployment tool
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DeployConfig> {
        let config_str = fs::read_to_string(path)?;
        let config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(config: &DeployConfig, path: P) -> Result<()> {
        let config_str = serde_json::to_string_pretty(config)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Create a builder for configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for deployment configurations
pub struct ConfigBuilder {
    config: DeployConfig,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            config: DeployConfig::default(),
        }
    }
}

impl ConfigBuilder {
    /// Add or replace a named network
    pub fn network(mut self, name: &str, network: NetworkConfig) -> Self {
        self.config.networks.insert(name.to_string(), network);
        self
    }

    /// Set whether the solc optimizer is enabled
    pub fn optimizer_enabled(mut self, value: bool) -> Self {
        self.config.compiler.optimizer.enabled = value;
        self
    }

    /// Set the solc optimizer run count
    pub fn optimizer_runs(mut self, value: u32) -> Self {
        self.config.compiler.optimizer.runs = value;
        self
    }

    /// Build the configuration
    pub fn build(self) -> DeployConfig {
        self.config
    }
}
