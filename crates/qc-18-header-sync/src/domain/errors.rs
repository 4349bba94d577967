//! # Domain Errors
//!
//! Error types for Header Sync.
//!
//! Every failure is a reported result. Nothing here is fatal to the host:
//! a rejected header never leaves partial state behind, and headers
//! committed earlier in the same batch stay committed.

use super::value_objects::ChainId;
use primitive_types::{H256, U256};
use thiserror::Error;

/// Result type alias for header sync operations.
pub type Result<T> = std::result::Result<T, HeaderSyncError>;

/// Structural decode failure raised by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input is not valid JSON or misses a required field.
    #[error("invalid json: {0}")]
    Json(String),

    /// Input is not a well-formed RLP header list.
    #[error("invalid rlp: {0}")]
    Rlp(String),

    /// A hex field could not be parsed.
    #[error("invalid hex in field `{field}`: {reason}")]
    Hex {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Parse failure detail.
        reason: String,
    },

    /// A fixed-width field has the wrong length.
    #[error("field `{field}` must be {expected} bytes, got {actual}")]
    Length {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Observed length.
        actual: usize,
    },

    /// The RLP list has an unexpected number of items.
    #[error("header list has {0} items, expected 15 or 16")]
    ItemCount(usize),

    /// Bytes left over after the header.
    #[error("{0} trailing bytes after header")]
    TrailingBytes(usize),

    /// Raw header exceeds the configured size limit.
    #[error("header is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Raw size.
        size: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The relayer-declared hash does not match the computed content hash.
    #[error("declared hash {declared:?} does not match computed {computed:?}")]
    HashMismatch {
        /// Hash carried in the payload.
        declared: H256,
        /// Keccak-256 over the canonical encoding.
        computed: H256,
    },
}

/// Key-value store failure reported by the storage adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Detail from the backend.
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Detail from the backend.
        message: String,
    },
}

/// Header sync error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderSyncError {
    /// Raw bytes do not form a header.
    #[error("malformed header: {0}")]
    MalformedHeader(#[from] DecodeError),

    /// Genesis was already bootstrapped for this chain.
    #[error("genesis already set for chain {0}")]
    GenesisAlreadySet(ChainId),

    /// Headers submitted before genesis bootstrap.
    #[error("chain {0} has no genesis header")]
    ChainNotBootstrapped(ChainId),

    /// No consensus rules registered for this chain.
    #[error("chain {0} is not registered")]
    UnsupportedChain(ChainId),

    /// Parent header is not stored.
    #[error("unknown parent {0:?}")]
    UnknownParent(H256),

    /// Header number does not follow its parent.
    #[error("invalid height: expected {expected}, got {actual}")]
    InvalidHeight {
        /// Parent number + 1.
        expected: u64,
        /// Declared number.
        actual: u64,
    },

    /// Declared difficulty differs from the adjustment rule.
    #[error("invalid difficulty: expected {expected}, got {actual}")]
    InvalidDifficulty {
        /// Difficulty derived from the parent.
        expected: U256,
        /// Difficulty declared by the header.
        actual: U256,
    },

    /// Seal proof does not meet the declared difficulty.
    #[error("invalid seal on header {0:?}")]
    InvalidSeal(H256),

    /// Timestamp not after parent, or too far ahead of host time.
    #[error("invalid timestamp {timestamp}: {reason}")]
    InvalidTimestamp {
        /// Declared header timestamp.
        timestamp: u64,
        /// Which bound was violated.
        reason: String,
    },

    /// Extra data longer than the family allows.
    #[error("extra data too large: {size} > {limit}")]
    ExtraDataTooLarge {
        /// Declared size.
        size: usize,
        /// Limit.
        limit: usize,
    },

    /// Gas limit out of bounds or moved too far from the parent.
    #[error("invalid gas limit {gas_limit} (parent {parent_gas_limit})")]
    InvalidGasLimit {
        /// Declared gas limit.
        gas_limit: u64,
        /// Parent gas limit after fork adjustment.
        parent_gas_limit: u64,
    },

    /// Gas used exceeds gas limit.
    #[error("gas used {gas_used} exceeds gas limit {gas_limit}")]
    InvalidGasUsed {
        /// Declared gas used.
        gas_used: u64,
        /// Declared gas limit.
        gas_limit: u64,
    },

    /// Base fee missing, unexpected or wrong.
    #[error("invalid base fee: expected {expected:?}, got {actual:?}")]
    InvalidBaseFee {
        /// Base fee required by the parent.
        expected: Option<U256>,
        /// Base fee declared by the header.
        actual: Option<U256>,
    },

    /// Header is already stored. Soft: the batch continues.
    #[error("duplicate header {0:?}")]
    DuplicateHeader(H256),

    /// Reorganization would rewrite more heights than allowed.
    #[error("fork too deep: {depth} > {limit}")]
    ForkTooDeep {
        /// Heights that would be rewritten.
        depth: u64,
        /// Configured maximum.
        limit: u64,
    },

    /// Batch larger than the configured maximum.
    #[error("batch of {size} headers exceeds limit {limit}")]
    BatchTooLarge {
        /// Submitted batch size.
        size: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// No header stored under this hash.
    #[error("header not found: {0:?}")]
    HeaderNotFound(H256),

    /// No canonical header at this height.
    #[error("no canonical header at height {0}")]
    HeightNotFound(u64),

    /// Backend failure.
    #[error("storage error: {0}")]
    Storage(#[from] KVStoreError),

    /// Stored bytes that no longer decode.
    #[error("corrupted state: {0}")]
    Corrupted(String),
}

impl HeaderSyncError {
    /// Whether the error is a soft skip that lets the batch continue.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::DuplicateHeader(_))
    }

    /// Whether the error is a consensus-rule violation by the submitted header.
    pub fn is_consensus_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidHeight { .. }
                | Self::InvalidDifficulty { .. }
                | Self::InvalidSeal(_)
                | Self::InvalidTimestamp { .. }
                | Self::ExtraDataTooLarge { .. }
                | Self::InvalidGasLimit { .. }
                | Self::InvalidGasUsed { .. }
                | Self::InvalidBaseFee { .. }
        )
    }
}
