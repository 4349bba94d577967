//! # Header Sync Configuration
//!
//! Ledger-wide limits, per-chain registration data and the Ethash fork
//! schedule.

use crate::codec::HeaderEncoding;
use crate::domain::{
    ChainId, DEFAULT_ALLOWED_FUTURE_SECS, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_FORK_DEPTH,
    DEFAULT_MAX_HEADER_SIZE,
};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Header ledger configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderSyncConfig {
    /// Maximum heights a reorganization may rewrite, and the bound on the
    /// common-ancestor walk.
    pub max_fork_depth: u64,

    /// Maximum headers accepted in one `sync_block_header` call.
    pub max_batch_size: usize,

    /// Seconds a header timestamp may run ahead of the host timestamp.
    pub allowed_future_secs: u64,

    /// Maximum raw header size in bytes.
    pub max_header_size: usize,
}

impl Default for HeaderSyncConfig {
    fn default() -> Self {
        Self {
            max_fork_depth: DEFAULT_MAX_FORK_DEPTH,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            allowed_future_secs: DEFAULT_ALLOWED_FUTURE_SECS,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

impl HeaderSyncConfig {
    /// Create a config for testing (small limits).
    pub fn for_testing() -> Self {
        Self {
            max_fork_depth: 8,
            max_batch_size: 64,
            allowed_future_secs: DEFAULT_ALLOWED_FUTURE_SECS,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

/// Registration data of one source chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSpec {
    /// Identifier assigned by the host ledger.
    pub chain_id: ChainId,
    /// Human-readable name, used in logs.
    pub name: String,
    /// Wire format of submitted headers.
    #[serde(default)]
    pub encoding: HeaderEncoding,
}

impl ChainSpec {
    /// A chain with the default JSON encoding.
    pub fn new(chain_id: impl Into<ChainId>, name: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            name: name.into(),
            encoding: HeaderEncoding::default(),
        }
    }

    /// Override the header encoding.
    pub fn with_encoding(mut self, encoding: HeaderEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Ethash consensus parameters.
///
/// Fork fields hold the activation block number; `None` means the fork never
/// activates on this chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthashConfig {
    /// EIP-2 difficulty formula.
    pub homestead_block: Option<u64>,
    /// EIP-100 uncle-aware formula, first bomb delay.
    pub byzantium_block: Option<u64>,
    /// Bomb delay to 5M.
    pub constantinople_block: Option<u64>,
    /// Bomb delay to 9M.
    pub muir_glacier_block: Option<u64>,
    /// EIP-1559 base fee, bomb delay to 9.7M.
    pub london_block: Option<u64>,
    /// Bomb delay to 10.7M.
    pub arrow_glacier_block: Option<u64>,
    /// Bomb delay to 11.4M.
    pub gray_glacier_block: Option<u64>,

    /// Floor of the difficulty adjustment.
    pub minimum_difficulty: U256,
    /// Divisor of the per-block difficulty step.
    pub difficulty_bound_divisor: u64,
    /// Frontier block-time threshold in seconds.
    pub duration_limit: u64,

    /// Divisor of the allowed gas-limit change per block.
    pub gas_limit_bound_divisor: u64,
    /// Smallest allowed gas limit.
    pub min_gas_limit: u64,
    /// Largest allowed extra data in bytes.
    pub max_extra_data_size: usize,
}

impl EthashConfig {
    /// Ethereum mainnet schedule.
    pub fn mainnet() -> Self {
        Self {
            homestead_block: Some(1_150_000),
            byzantium_block: Some(4_370_000),
            constantinople_block: Some(7_280_000),
            muir_glacier_block: Some(9_200_000),
            london_block: Some(12_965_000),
            arrow_glacier_block: Some(13_773_000),
            gray_glacier_block: Some(15_050_000),
            minimum_difficulty: U256::from(131_072),
            difficulty_bound_divisor: 2048,
            duration_limit: 13,
            gas_limit_bound_divisor: 1024,
            min_gas_limit: 5000,
            max_extra_data_size: 32,
        }
    }

    /// Ropsten testnet schedule.
    ///
    /// Homestead from genesis. Ropsten skipped Arrow Glacier and Gray
    /// Glacier.
    pub fn ropsten() -> Self {
        Self {
            homestead_block: Some(0),
            byzantium_block: Some(1_700_000),
            constantinople_block: Some(4_230_000),
            muir_glacier_block: Some(7_117_117),
            london_block: Some(10_499_401),
            arrow_glacier_block: None,
            gray_glacier_block: None,
            ..Self::mainnet()
        }
    }

    /// Create a config for testing.
    ///
    /// All difficulty forks active from genesis, London never, minimum
    /// difficulty 1. Parents below the bound divisor keep a constant
    /// difficulty, so test chains can be mined instantly.
    pub fn for_testing() -> Self {
        Self {
            homestead_block: Some(0),
            byzantium_block: Some(0),
            constantinople_block: Some(0),
            muir_glacier_block: Some(0),
            london_block: None,
            arrow_glacier_block: None,
            gray_glacier_block: None,
            minimum_difficulty: U256::one(),
            ..Self::mainnet()
        }
    }

    /// Whether a fork is active at `number`.
    #[inline]
    pub fn is_active(fork: Option<u64>, number: u64) -> bool {
        fork.map_or(false, |block| number >= block)
    }
}

impl Default for EthashConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
