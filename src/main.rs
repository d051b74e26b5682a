// Crowdsale deployment CLI
//
// Command-line interface for publishing the Crowdsale contract: compute the
// sale parameters from the chain head and fire the creation transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand};

use crowdsale_deploy::config::{ConfigManager, DeployConfig, CREATOR_ACCOUNT_VAR};
use crowdsale_deploy::ethereum::{BlockingDeployer, RATE_DECIMALS};
use crowdsale_deploy::migration::{self, compute_parameters, Deployer};
use crowdsale_deploy::ContractArtifact;

/// Crowdsale deployment tool
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the crowdsale contract to a named network
    Deploy {
        /// Network name from the configuration
        #[arg(short, long, default_value = "classic")]
        network: String,

        /// Path to the creation bytecode hex file
        #[arg(short, long)]
        bytecode: PathBuf,

        /// Contract name used in logs and reports
        #[arg(long, default_value = "Crowdsale")]
        contract: String,

        /// Path to a configuration file; built-in defaults when absent
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the RPC endpoint derived from the network entry
        #[arg(long)]
        rpc_url: Option<String>,
    },

    /// Compute and print the deployment parameters without deploying
    Params {
        /// Chain timestamp to compute from; read from the chain head when absent
        #[arg(short, long)]
        timestamp: Option<u64>,

        /// RPC endpoint used to read the chain head
        #[arg(long, default_value = "http://localhost:8545")]
        rpc_url: String,
    },

    /// List the configured networks and compiler settings
    ListNetworks {
        /// Path to a configuration file; built-in defaults when absent
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a default configuration file
    Config {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn load_config(path: &Option<PathBuf>) -> Result<DeployConfig> {
    match path {
        Some(path) => ConfigManager::load_from_file(path).context("Failed to load configuration"),
        None => Ok(DeployConfig::default()),
    }
}

fn format_time(seconds: u64) -> String {
    match DateTime::from_timestamp(seconds as i64, 0) {
        Some(dt) => dt.to_rfc3339(),
        None => format!("{} (outside the representable range)", seconds),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deploy {
            network,
            bytecode,
            contract,
            config,
            rpc_url,
        } => {
            let config = load_config(&config)?;
            let network_config = config.network(&network)?;
            let artifact = ContractArtifact::from_hex_file(&contract, &bytecode)?;

            let url = rpc_url.unwrap_or_else(|| network_config.rpc_url());
            let deployer = BlockingDeployer::new(&url)?;

            let chain_id = deployer.chain_id().context("Failed to reach the node")?;
            println!(
                "Deploying {} to {} (network id {}, chain id {})",
                artifact.name, network, network_config.network_id, chain_id
            );

            let outcome = migration::run(&deployer, &artifact, network_config)?;

            println!("Deploy transaction: {:?}", outcome.transaction_hash);
            if let Some(address) = outcome.contract_address {
                println!("Contract address: {:?}", address);
            }
            if let Some(gas) = outcome.gas_used {
                println!("Gas used: {}", gas);
            }
            Ok(())
        }

        Commands::Params { timestamp, rpc_url } => {
            let current = match timestamp {
                Some(ts) => ts,
                None => {
                    let deployer = BlockingDeployer::new(&rpc_url)?;
                    deployer
                        .current_timestamp()
                        .context("Failed to read the chain head")?
                }
            };
            let params = compute_parameters(current)?;

            println!("Chain time: {} ({})", current, format_time(current));
            println!(
                "Sale start: {} ({})",
                params.start_time,
                format_time(params.start_time)
            );
            println!(
                "Sale end:   {} ({})",
                params.end_time,
                format_time(params.end_time)
            );
            println!(
                "Rate:       {}/{} ({:.16})",
                params.rate.numerator,
                params.rate.denominator,
                params.rate.as_f64()
            );
            println!(
                "Rate ({}-decimal fixed point): {}",
                RATE_DECIMALS,
                params.rate.to_fixed_point(RATE_DECIMALS)
            );
            println!("Gas limit:  {}", params.gas_limit);
            Ok(())
        }

        Commands::ListNetworks { config } => {
            let config = load_config(&config)?;

            println!("Configured networks:");
            println!("--------------------");
            let mut names: Vec<_> = config.networks.keys().collect();
            names.sort();
            for name in names {
                let network = &config.networks[name];
                println!("- {} (network id {})", name, network.network_id);
                println!("  Endpoint: {}", network.rpc_url());
                println!("  Gas: {}", network.gas);
                match network.from {
                    Some(from) => println!("  From: {:?}", from),
                    None => println!("  From: ${} environment variable", CREATOR_ACCOUNT_VAR),
                }
                println!();
            }

            let optimizer = config.compiler.optimizer;
            println!(
                "Compiler optimizer: enabled={} runs={}",
                optimizer.enabled, optimizer.runs
            );
            Ok(())
        }

        Commands::Config { output } => {
            let config = DeployConfig::default();
            ConfigManager::save_to_file(&config, &output)
                .context("Failed to save configuration")?;
            println!("Default configuration saved to {:?}", output);
            Ok(())
        }
    }
}
