use ethers::types::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParameterError {
    #[error("chain time unavailable: {0}")]
    ChainTimeUnavailable(String),
    #[error("sale window overflows unix time (chain time {0})")]
    WindowOverflow(u64),
    #[error("invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("invalid sale window: start {start} is not before end {end}")]
    InvalidWindow { start: u64, end: u64 },
}

/// Exchange rate between the chain's native coin and the sale token, kept
/// as an exact rational to avoid rounding drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    pub numerator: u64,
    pub denominator: u64,
}

impl Rate {
    /// Create a new rate, rejecting degenerate values
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, ParameterError> {
        if numerator == 0 || denominator == 0 {
            return Err(ParameterError::InvalidRate(format!(
                "{}/{} is not a positive rational",
                numerator, denominator
            )));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Approximate the rate as a float for display and tolerance checks
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Project the rate onto an integer with the given number of decimals.
    /// 18 decimals matches the token precision used on chain.
    pub fn to_fixed_point(&self, decimals: usize) -> U256 {
        U256::from(self.numerator) * U256::exp10(decimals) / U256::from(self.denominator)
    }
}

/// Parameters for a single crowdsale deployment. Built once per invocation
/// and handed to the deploy primitive unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentParameters {
    /// Sale opening time, seconds since the unix epoch
    pub start_time: u64,

    /// Sale closing time, seconds since the unix epoch
    pub end_time: u64,

    /// Coin-to-token exchange rate
    pub rate: Rate,

    /// Gas ceiling for the creation transaction
    pub gas_limit: U256,
}

impl DeploymentParameters {
    /// Check the sale window and rate invariants
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.end_time <= self.start_time {
            return Err(ParameterError::InvalidWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }
        if self.rate.numerator == 0 || self.rate.denominator == 0 {
            return Err(ParameterError::InvalidRate(format!(
                "{}/{} is not a positive rational",
                self.rate.numerator, self.rate.denominator
            )));
        }
        Ok(())
    }
}
