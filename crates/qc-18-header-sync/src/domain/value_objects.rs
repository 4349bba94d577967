//! # Value Objects
//!
//! Immutable values exchanged across the header sync boundary.

use super::errors::HeaderSyncError;
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier of a source chain, assigned by the host ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Fixed-width big-endian encoding used inside storage keys.
    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trust anchor of a bootstrapped chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisInfo {
    /// Content hash of the genesis header.
    pub hash: H256,
    /// Height of the genesis header.
    pub height: u64,
}

/// Canonical tip of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    /// Hash at the tip.
    pub hash: H256,
    /// Tip height.
    pub height: u64,
    /// Cumulative difficulty from genesis to the tip.
    pub difficulty_sum: U256,
}

/// What happened to one header of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderOutcome {
    /// Stored. `canonical` is true when it became the new tip.
    Accepted {
        /// Content hash.
        hash: H256,
        /// Header number.
        number: u64,
        /// Whether the header is the canonical tip after processing.
        canonical: bool,
    },
    /// Already stored, skipped.
    Duplicate {
        /// Content hash.
        hash: H256,
    },
}

impl HeaderOutcome {
    /// Content hash of the processed header.
    pub fn hash(&self) -> H256 {
        match self {
            Self::Accepted { hash, .. } | Self::Duplicate { hash } => *hash,
        }
    }
}

/// Result of a `sync_block_header` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Chain the batch was applied to.
    pub chain_id: ChainId,
    /// One entry per processed header, in submission order.
    pub outcomes: Vec<HeaderOutcome>,
    /// Number of reorganizations triggered by the batch.
    pub reorgs: u32,
    /// Headers decoded, for the host's cost accounting.
    pub work_units: u64,
    /// Canonical tip after the batch.
    pub tip: Option<ChainTip>,
}

impl SyncReport {
    /// Empty report for a chain.
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            chain_id,
            outcomes: Vec::new(),
            reorgs: 0,
            work_units: 0,
            tip: None,
        }
    }

    /// Headers newly stored by the batch.
    pub fn accepted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, HeaderOutcome::Accepted { .. }))
            .count()
    }

    /// Headers skipped as duplicates.
    pub fn duplicates(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, HeaderOutcome::Duplicate { .. }))
            .count()
    }
}

/// A batch stopped early.
///
/// Headers before `index` stay committed; `report` describes them.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("header sync failed at {index:?}: {error}")]
pub struct SyncFailure {
    /// Position of the rejected header, or `None` when the call itself was refused.
    pub index: Option<usize>,
    /// Why processing stopped.
    pub error: HeaderSyncError,
    /// Work committed before the failure.
    pub report: SyncReport,
}

/// Parameters of `syncGenesisHeader`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncGenesisHeaderParam {
    /// Target chain.
    pub chain_id: ChainId,
    /// Raw genesis header in the chain's configured encoding.
    pub genesis_header: Vec<u8>,
}

/// Parameters of `syncBlockHeader`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBlockHeaderParam {
    /// Target chain.
    pub chain_id: ChainId,
    /// Raw headers, processed in order.
    pub headers: Vec<Vec<u8>>,
    /// Block time of the executing host transaction, bounds header timestamps.
    #[serde(default)]
    pub host_timestamp: Option<u64>,
}
