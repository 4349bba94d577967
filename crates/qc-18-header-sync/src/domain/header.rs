//! # Source Header
//!
//! In-memory form of an Ethereum-family proof-of-work block header.

use crate::codec;
use primitive_types::{H160, H256, U256};
use std::fmt;

/// Keccak-256 of the RLP empty list, the uncle hash of a block without uncles.
pub const EMPTY_UNCLE_HASH: H256 = H256([
    0x1d, 0xcc, 0x4d, 0xe8, 0xde, 0xc7, 0x5d, 0x7a, 0xab, 0x85, 0xb5, 0x67, 0xb6, 0xcc, 0xd4, 0x1a,
    0xd3, 0x12, 0x45, 0x1b, 0x94, 0x8a, 0x74, 0x13, 0xf0, 0xa1, 0x42, 0xfd, 0x40, 0xd4, 0x93, 0x47,
]);

/// Size of the logs bloom filter in bytes.
pub const BLOOM_SIZE: usize = 256;

/// 2048-bit logs bloom.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Bloom(pub [u8; BLOOM_SIZE]);

impl Default for Bloom {
    fn default() -> Self {
        Self([0u8; BLOOM_SIZE])
    }
}

impl fmt::Debug for Bloom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bloom(0x{})", hex::encode(self.0))
    }
}

/// 64-bit Ethash nonce, stored big-endian as on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockNonce(pub [u8; 8]);

impl BlockNonce {
    /// Nonce as an integer (big-endian interpretation).
    pub fn to_u64(self) -> u64 {
        u64::from_be_bytes(self.0)
    }
}

impl From<u64> for BlockNonce {
    fn from(value: u64) -> Self {
        Self(value.to_be_bytes())
    }
}

/// Block header of the source chain.
///
/// Identity is the Keccak-256 of the canonical RLP encoding, see
/// [`SourceHeader::hash`]. `mix_digest` and `nonce` are the seal fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceHeader {
    /// Hash of the parent header.
    pub parent_hash: H256,
    /// Hash of the uncle list.
    pub uncle_hash: H256,
    /// Beneficiary address.
    pub coinbase: H160,
    /// State trie root.
    pub state_root: H256,
    /// Transaction trie root.
    pub transactions_root: H256,
    /// Receipt trie root.
    pub receipts_root: H256,
    /// Logs bloom.
    pub logs_bloom: Bloom,
    /// Declared difficulty.
    pub difficulty: U256,
    /// Block height.
    pub number: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Gas used.
    pub gas_used: u64,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
    /// Arbitrary miner data.
    pub extra_data: Vec<u8>,
    /// Ethash mix digest.
    pub mix_digest: H256,
    /// Ethash nonce.
    pub nonce: BlockNonce,
    /// EIP-1559 base fee, present from London on.
    pub base_fee: Option<U256>,
}

impl SourceHeader {
    /// Content hash: Keccak-256 over the canonical RLP encoding.
    pub fn hash(&self) -> H256 {
        codec::content_hash(self)
    }

    /// Hash of the header without its seal fields, the Ethash input.
    pub fn seal_hash(&self) -> H256 {
        codec::seal_hash(self)
    }

    /// Whether the block references any uncles.
    pub fn has_uncles(&self) -> bool {
        self.uncle_hash != EMPTY_UNCLE_HASH
    }
}
