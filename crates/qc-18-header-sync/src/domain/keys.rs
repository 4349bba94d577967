//! # Storage Keys
//!
//! Composite keys: `NAMESPACE | category | chain_id(8, BE) | discriminator`.
//!
//! | Category | Discriminator | Value |
//! |----------|---------------|-------|
//! | `currentHeaderHeight` | none | tip height, 8 bytes LE |
//! | `mainChain` | height (8, BE) | canonical hash |
//! | `headerIndex` | hash (32) | [`HeaderRecord`](super::HeaderRecord) bytes |
//! | `genesisHeader` | none | genesis hash |
//!
//! Heights are big-endian inside keys so a prefix scan of one chain's
//! `mainChain` entries comes back in height order on ordered backends.

use super::value_objects::ChainId;
use primitive_types::H256;

/// Module namespace shared by every key.
pub const NAMESPACE: &[u8] = b"header_sync";

/// Category: canonical tip height.
pub const CURRENT_HEIGHT: &[u8] = b"currentHeaderHeight";
/// Category: canonical index.
pub const MAIN_CHAIN: &[u8] = b"mainChain";
/// Category: stored header records.
pub const HEADER_INDEX: &[u8] = b"headerIndex";
/// Category: genesis anchor.
pub const GENESIS_HEADER: &[u8] = b"genesisHeader";

fn concat(category: &[u8], chain_id: ChainId, discriminator: &[u8]) -> Vec<u8> {
    let mut key =
        Vec::with_capacity(NAMESPACE.len() + category.len() + 8 + discriminator.len());
    key.extend_from_slice(NAMESPACE);
    key.extend_from_slice(category);
    key.extend_from_slice(&chain_id.to_be_bytes());
    key.extend_from_slice(discriminator);
    key
}

/// Key of the tip height.
pub fn current_height_key(chain_id: ChainId) -> Vec<u8> {
    concat(CURRENT_HEIGHT, chain_id, &[])
}

/// Key of the canonical hash at `height`.
pub fn main_chain_key(chain_id: ChainId, height: u64) -> Vec<u8> {
    concat(MAIN_CHAIN, chain_id, &height.to_be_bytes())
}

/// Prefix of all canonical index entries of a chain.
pub fn main_chain_prefix(chain_id: ChainId) -> Vec<u8> {
    concat(MAIN_CHAIN, chain_id, &[])
}

/// Key of the record stored under `hash`.
pub fn header_index_key(chain_id: ChainId, hash: &H256) -> Vec<u8> {
    concat(HEADER_INDEX, chain_id, hash.as_bytes())
}

/// Prefix of all header records of a chain.
pub fn header_index_prefix(chain_id: ChainId) -> Vec<u8> {
    concat(HEADER_INDEX, chain_id, &[])
}

/// Key of the genesis hash.
pub fn genesis_key(chain_id: ChainId) -> Vec<u8> {
    concat(GENESIS_HEADER, chain_id, &[])
}

/// Encode a height value as stored under [`current_height_key`].
pub fn encode_height(height: u64) -> [u8; 8] {
    height.to_le_bytes()
}

/// Decode a stored height value.
pub fn decode_height(bytes: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = bytes.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
