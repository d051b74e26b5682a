// Crowdsale migration
//
// Re-creates the deployment migration: read the current chain time, derive
// the sale window and exchange rate from it, and fire a single deploy call.

use anyhow::Result;
use common::{DeploymentParameters, ParameterError, Rate};
use ethers::types::{Address, U256};
use log::info;

use crate::artifact::ContractArtifact;
use crate::config::NetworkConfig;
use crate::ethereum::DeployOutcome;

/// Seconds between the observed chain time and the sale opening
pub const SALE_START_DELAY_SECS: u64 = 240;

/// Sale window length in days
pub const SALE_DURATION_DAYS: u64 = 241;

/// Seconds per day
pub const SECS_PER_DAY: u64 = 86_400;

/// Sale window length in seconds
pub const SALE_DURATION_SECS: u64 = SALE_DURATION_DAYS * SECS_PER_DAY;

/// One native coin buys this many sale tokens
pub const TOKENS_PER_COIN: u64 = 44;

/// Gas ceiling for the creation transaction
pub const DEPLOY_GAS_LIMIT: u64 = 2_000_000;

/// Compute the deployment parameters for a sale opening shortly after the
/// given chain time. Pure; unix-time overflow fails fast.
pub fn compute_parameters(
    current_timestamp: u64,
) -> Result<DeploymentParameters, ParameterError> {
    let start_time = current_timestamp
        .checked_add(SALE_START_DELAY_SECS)
        .ok_or(ParameterError::WindowOverflow(current_timestamp))?;
    let end_time = start_time
        .checked_add(SALE_DURATION_SECS)
        .ok_or(ParameterError::WindowOverflow(current_timestamp))?;

    let params = DeploymentParameters {
        start_time,
        end_time,
        rate: Rate::new(1, TOKENS_PER_COIN)?,
        gas_limit: U256::from(DEPLOY_GAS_LIMIT),
    };
    params.validate()?;
    Ok(params)
}

/// The external deployment primitive and the chain-time source it depends on
pub trait Deployer {
    /// Timestamp of the latest block, seconds since the unix epoch
    fn current_timestamp(&self) -> Result<u64>;

    /// Submit the contract creation transaction. Fire-once: failures are
    /// returned to the caller unmodified, never retried here.
    fn deploy(
        &self,
        artifact: &ContractArtifact,
        params: &DeploymentParameters,
        from: Address,
    ) -> Result<DeployOutcome>;
}

/// Run the migration against one network: read the chain time, compute the
/// sale parameters, submit the deployment
pub fn run<D: Deployer>(
    deployer: &D,
    artifact: &ContractArtifact,
    network: &NetworkConfig,
) -> Result<DeployOutcome> {
    let from = network.sender()?;
    let current = deployer.current_timestamp()?;
    let params = compute_parameters(current)?;

    info!(
        "deploying {} from {:?}: sale window {}..{}, rate {}/{}, gas {}",
        artifact.name,
        from,
        params.start_time,
        params.end_time,
        params.rate.numerator,
        params.rate.denominator,
        params.gas_limit
    );

    deployer.deploy(artifact, &params, from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_offsets_are_fixed() {
        for &ts in &[0u64, 1, 1_500_000_000, 4_000_000_000] {
            let params = compute_parameters(ts).unwrap();
            assert_eq!(params.start_time, ts + SALE_START_DELAY_SECS);
            assert_eq!(params.end_time, params.start_time + 20_822_400);
        }
    }

    #[test]
    fn source_example_vector() {
        let params = compute_parameters(1_000_000).unwrap();
        assert_eq!(params.start_time, 1_000_240);
        assert_eq!(params.end_time, 21_822_640);
    }

    #[test]
    fn gas_limit_is_static() {
        let params = compute_parameters(1_700_000_000).unwrap();
        assert_eq!(params.gas_limit, U256::from(2_000_000u64));
    }

    #[test]
    fn rate_is_one_over_forty_four() {
        let params = compute_parameters(0).unwrap();
        assert_eq!(params.rate, Rate::new(1, 44).unwrap());
        assert!((params.rate.as_f64() - 0.0227272727272727).abs() < 1e-12);
    }

    #[test]
    fn unix_time_overflow_fails_fast() {
        assert!(matches!(
            compute_parameters(u64::MAX),
            Err(ParameterError::WindowOverflow(_))
        ));
        assert!(matches!(
            compute_parameters(u64::MAX - SALE_START_DELAY_SECS),
            Err(ParameterError::WindowOverflow(_))
        ));
    }
}
