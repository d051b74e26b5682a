// Ethereum connectivity
//
// Thin layer over the JSON-RPC provider: chain identity, chain time, and
// the contract creation call.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use common::{DeploymentParameters, ParameterError};
use ethers::abi::{self, Token};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, BlockNumber, Bytes, TransactionRequest, H256, U256, U64};
use log::{debug, info};

use crate::artifact::ContractArtifact;
use crate::migration::Deployer;

/// Decimals used for the on-chain fixed-point rate
pub const RATE_DECIMALS: usize = 18;

/// Result of a successful deployment
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Address of the created contract, when the node reports one
    pub contract_address: Option<Address>,

    /// Hash of the creation transaction
    pub transaction_hash: H256,

    /// Gas consumed by the creation transaction
    pub gas_used: Option<U256>,

    /// Block the transaction was mined in
    pub block_number: Option<U64>,
}

/// ABI-encode the crowdsale constructor arguments
/// `(uint256 startTime, uint256 endTime, uint256 rate)`
pub fn encode_constructor_args(params: &DeploymentParameters) -> Vec<u8> {
    abi::encode(&[
        Token::Uint(U256::from(params.start_time)),
        Token::Uint(U256::from(params.end_time)),
        Token::Uint(params.rate.to_fixed_point(RATE_DECIMALS)),
    ])
}

/// Creation payload: bytecode followed by the encoded constructor arguments
pub fn build_creation_data(artifact: &ContractArtifact, params: &DeploymentParameters) -> Bytes {
    let mut data = artifact.bytecode.to_vec();
    data.extend_from_slice(&encode_constructor_args(params));
    Bytes::from(data)
}

/// Interface to an Ethereum JSON-RPC endpoint
pub struct EthereumConnector {
    provider: Arc<Provider<Http>>,
}

impl EthereumConnector {
    /// Create new connector for the given RPC URL
    pub fn new(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;
        Ok(Self {
            provider: Arc::new(provider),
        })
    }

    /// Chain id reported by the node
    pub async fn chain_id(&self) -> Result<u64> {
        let id = self.provider.get_chainid().await?;
        Ok(id.as_u64())
    }

    /// Timestamp of the latest block, seconds since the unix epoch
    pub async fn latest_block_timestamp(&self) -> Result<u64> {
        let block = self
            .provider
            .get_block(BlockNumber::Latest)
            .await?
            .ok_or_else(|| {
                ParameterError::ChainTimeUnavailable("node returned no latest block".to_string())
            })?;
        Ok(block.timestamp.as_u64())
    }

    /// Submit the contract creation transaction and wait for its receipt.
    /// The sender account must be managed by the node, as with the original
    /// deployment tooling; failures surface to the caller unmodified.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        params: &DeploymentParameters,
        from: Address,
    ) -> Result<DeployOutcome> {
        let data = build_creation_data(artifact, params);
        debug!(
            "creation payload for {}: {} bytes",
            artifact.name,
            data.len()
        );

        let tx = TransactionRequest::new()
            .from(from)
            .gas(params.gas_limit)
            .data(data);

        let pending = self.provider.send_transaction(tx, None).await?;
        let tx_hash = *pending;
        info!("deploy transaction sent: {:?}", tx_hash);

        let receipt = pending
            .await?
            .ok_or_else(|| anyhow!("deploy transaction {:?} was dropped by the node", tx_hash))?;

        Ok(DeployOutcome {
            contract_address: receipt.contract_address,
            transaction_hash: receipt.transaction_hash,
            gas_used: receipt.gas_used,
            block_number: receipt.block_number,
        })
    }
}

/// Drives the async connector from synchronous code on its own runtime
pub struct BlockingDeployer {
    connector: EthereumConnector,
    runtime: tokio::runtime::Runtime,
}

impl BlockingDeployer {
    /// Create a connector with a dedicated runtime
    pub fn new(rpc_url: &str) -> Result<Self> {
        Ok(Self {
            connector: EthereumConnector::new(rpc_url)?,
            runtime: tokio::runtime::Runtime::new()?,
        })
    }

    /// Chain id reported by the node
    pub fn chain_id(&self) -> Result<u64> {
        self.runtime.block_on(self.connector.chain_id())
    }
}

impl Deployer for BlockingDeployer {
    fn current_timestamp(&self) -> Result<u64> {
        self.runtime
            .block_on(self.connector.latest_block_timestamp())
    }

    fn deploy(
        &self,
        artifact: &ContractArtifact,
        params: &DeploymentParameters,
        from: Address,
    ) -> Result<DeployOutcome> {
        self.runtime
            .block_on(self.connector.deploy(artifact, params, from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::compute_parameters;

    #[test]
    fn constructor_args_are_three_words() {
        let params = compute_parameters(1_000_000).unwrap();
        let encoded = encode_constructor_args(&params);
        assert_eq!(encoded.len(), 96);

        assert_eq!(
            U256::from_big_endian(&encoded[0..32]),
            U256::from(1_000_240u64)
        );
        assert_eq!(
            U256::from_big_endian(&encoded[32..64]),
            U256::from(21_822_640u64)
        );
        assert_eq!(
            U256::from_big_endian(&encoded[64..96]),
            U256::from(22_727_272_727_272_727u64)
        );
    }

    #[test]
    fn creation_data_prefixes_bytecode() {
        let artifact = ContractArtifact::from_hex_str("Crowdsale", "0x6080604052").unwrap();
        let params = compute_parameters(1_000_000).unwrap();

        let data = build_creation_data(&artifact, &params);
        assert_eq!(data.len(), artifact.bytecode.len() + 96);
        assert!(data.starts_with(&artifact.bytecode));
    }
}
