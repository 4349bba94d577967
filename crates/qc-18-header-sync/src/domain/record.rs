//! # Header Record
//!
//! The stored value behind every accepted header: the header itself plus its
//! cumulative difficulty. Records are content addressed and never rewritten.

use super::errors::HeaderSyncError;
use super::header::SourceHeader;
use crate::codec;
use primitive_types::{H256, U256};
use serde::{Deserialize, Serialize};

/// A stored header with its fork-choice weight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderRecord {
    /// The header.
    pub header: SourceHeader,
    /// Sum of difficulties from genesis to this header, inclusive.
    pub difficulty_sum: U256,
}

/// Storage layout of a [`HeaderRecord`].
///
/// The header is kept as canonical RLP so the stored bytes are exactly the
/// preimage of its content hash.
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    header: Vec<u8>,
    difficulty_sum: U256,
}

impl HeaderRecord {
    /// Record for a genesis header: its weight is its own difficulty.
    pub fn genesis(header: SourceHeader) -> Self {
        let difficulty_sum = header.difficulty;
        Self {
            header,
            difficulty_sum,
        }
    }

    /// Record for a header extending `parent`.
    ///
    /// Saturates instead of overflowing; a sum near 2^256 is not reachable
    /// by real work.
    pub fn child_of(parent: &HeaderRecord, header: SourceHeader) -> Self {
        let difficulty_sum = parent.difficulty_sum.saturating_add(header.difficulty);
        Self {
            header,
            difficulty_sum,
        }
    }

    /// Content hash of the stored header.
    pub fn hash(&self) -> H256 {
        self.header.hash()
    }

    /// Header number.
    pub fn number(&self) -> u64 {
        self.header.number
    }

    /// Serialize for the store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, HeaderSyncError> {
        let stored = StoredRecord {
            header: codec::encode_rlp(&self.header),
            difficulty_sum: self.difficulty_sum,
        };
        bincode::serialize(&stored)
            .map_err(|e| HeaderSyncError::Corrupted(format!("record encoding: {e}")))
    }

    /// Deserialize bytes written by [`HeaderRecord::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderSyncError> {
        let stored: StoredRecord = bincode::deserialize(bytes)
            .map_err(|e| HeaderSyncError::Corrupted(format!("record decoding: {e}")))?;
        let header = codec::decode_rlp(&stored.header)
            .map_err(|e| HeaderSyncError::Corrupted(format!("stored header: {e}")))?;
        Ok(Self {
            header,
            difficulty_sum: stored.difficulty_sum,
        })
    }
}
