//! Ethereum proof-of-work consensus rules.

use crate::algorithms::{ethash, DifficultyCalculator};
use crate::config::EthashConfig;
use crate::domain::{HeaderSyncError, Result, SourceHeader};
use crate::ports::ConsensusRules;
use primitive_types::U256;

/// Upper bound on the gas limit (2^63 - 1).
pub const MAX_GAS_LIMIT: u64 = 0x7fff_ffff_ffff_ffff;

/// EIP-1559 base fee of the London activation block (1 gwei).
pub const INITIAL_BASE_FEE: u64 = 1_000_000_000;

/// EIP-1559 gas target multiplier.
pub const ELASTICITY_MULTIPLIER: u64 = 2;

/// EIP-1559 maximum base fee change, as a divisor.
pub const BASE_FEE_CHANGE_DENOMINATOR: u64 = 8;

/// [`ConsensusRules`] for Ethash chains.
#[derive(Clone, Debug)]
pub struct EthashRules {
    calculator: DifficultyCalculator,
}

impl EthashRules {
    /// Rules for a fork schedule.
    pub fn new(config: EthashConfig) -> Self {
        Self {
            calculator: DifficultyCalculator::new(config),
        }
    }

    /// Ethereum mainnet rules.
    pub fn mainnet() -> Self {
        Self::new(EthashConfig::mainnet())
    }

    /// Ropsten testnet rules.
    pub fn ropsten() -> Self {
        Self::new(EthashConfig::ropsten())
    }

    fn config(&self) -> &EthashConfig {
        self.calculator.config()
    }

    fn is_london(&self, number: u64) -> bool {
        EthashConfig::is_active(self.config().london_block, number)
    }

    fn verify_gas_limit(&self, parent: &SourceHeader, header: &SourceHeader) -> Result<()> {
        let config = self.config();
        let mut parent_gas_limit = parent.gas_limit;
        if self.is_london(header.number) && !self.is_london(parent.number) {
            parent_gas_limit = parent_gas_limit.saturating_mul(ELASTICITY_MULTIPLIER);
        }

        let invalid = HeaderSyncError::InvalidGasLimit {
            gas_limit: header.gas_limit,
            parent_gas_limit,
        };
        if header.gas_limit > MAX_GAS_LIMIT || header.gas_limit < config.min_gas_limit {
            return Err(invalid);
        }
        let diff = header.gas_limit.abs_diff(parent_gas_limit);
        if diff >= parent_gas_limit / config.gas_limit_bound_divisor {
            return Err(invalid);
        }
        Ok(())
    }

    /// Base fee required of a child of `parent`, `None` before London.
    ///
    /// A London parent without a base fee yields `Some(zero)` so that any
    /// declared value is rejected.
    pub fn expected_base_fee(&self, parent: &SourceHeader, number: u64) -> Option<U256> {
        if !self.is_london(number) {
            return None;
        }
        if !self.is_london(parent.number) {
            return Some(U256::from(INITIAL_BASE_FEE));
        }
        let Some(parent_base_fee) = parent.base_fee else {
            return Some(U256::zero());
        };

        let target = parent.gas_limit / ELASTICITY_MULTIPLIER;
        if target == 0 || parent.gas_used == target {
            return Some(parent_base_fee);
        }

        let denominator = U256::from(BASE_FEE_CHANGE_DENOMINATOR);
        if parent.gas_used > target {
            let delta = U256::from(parent.gas_used - target);
            let change = (parent_base_fee.saturating_mul(delta) / U256::from(target) / denominator)
                .max(U256::one());
            Some(parent_base_fee.saturating_add(change))
        } else {
            let delta = U256::from(target - parent.gas_used);
            let change = parent_base_fee.saturating_mul(delta) / U256::from(target) / denominator;
            Some(parent_base_fee.saturating_sub(change))
        }
    }

    fn verify_base_fee(&self, parent: &SourceHeader, header: &SourceHeader) -> Result<()> {
        let expected = self.expected_base_fee(parent, header.number);
        let matches = match (expected, header.base_fee) {
            (None, None) => true,
            (Some(expected), Some(actual)) => !expected.is_zero() && expected == actual,
            _ => false,
        };
        if !matches {
            return Err(HeaderSyncError::InvalidBaseFee {
                expected,
                actual: header.base_fee,
            });
        }
        Ok(())
    }
}

impl ConsensusRules for EthashRules {
    fn name(&self) -> &'static str {
        "ethash"
    }

    fn verify_fields(&self, parent: &SourceHeader, header: &SourceHeader) -> Result<()> {
        let limit = self.config().max_extra_data_size;
        if header.extra_data.len() > limit {
            return Err(HeaderSyncError::ExtraDataTooLarge {
                size: header.extra_data.len(),
                limit,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(HeaderSyncError::InvalidGasUsed {
                gas_used: header.gas_used,
                gas_limit: header.gas_limit,
            });
        }
        self.verify_gas_limit(parent, header)?;
        self.verify_base_fee(parent, header)
    }

    fn expected_difficulty(&self, parent: &SourceHeader, header: &SourceHeader) -> U256 {
        self.calculator.calculate(parent, header.timestamp)
    }

    fn verify_seal(&self, header: &SourceHeader) -> bool {
        ethash::verify_seal(header)
    }
}
