//! Ethash seal verification.
//!
//! Quick verification only: the final hash is recomputed from the seal hash,
//! the nonce and the declared mix digest, then compared with the difficulty
//! boundary. The mix digest itself is not rebuilt from the DAG.

use crate::codec::keccak256;
use crate::domain::{BlockNonce, SourceHeader};
use primitive_types::{H256, U256, U512};
use sha3::{Digest, Keccak512};

/// Final Ethash hash: `keccak256(keccak512(seal_hash ‖ nonce_le) ‖ mix_digest)`.
pub fn quick_hash(seal_hash: &H256, nonce: BlockNonce, mix_digest: &H256) -> H256 {
    let mut seed_input = [0u8; 40];
    seed_input[..32].copy_from_slice(seal_hash.as_bytes());
    seed_input[32..].copy_from_slice(&nonce.to_u64().to_le_bytes());
    let seed = Keccak512::digest(seed_input);

    let mut final_input = [0u8; 96];
    final_input[..64].copy_from_slice(&seed);
    final_input[64..].copy_from_slice(mix_digest.as_bytes());
    keccak256(&final_input)
}

/// Seal boundary `2^256 / difficulty`. `None` for zero difficulty.
pub fn boundary(difficulty: U256) -> Option<U512> {
    if difficulty.is_zero() {
        return None;
    }
    Some((U512::one() << 256) / U512::from(difficulty))
}

/// Whether the header's seal meets its declared difficulty.
pub fn verify_seal(header: &SourceHeader) -> bool {
    let Some(boundary) = boundary(header.difficulty) else {
        return false;
    };
    let result = quick_hash(&header.seal_hash(), header.nonce, &header.mix_digest);
    U512::from_big_endian(result.as_bytes()) <= boundary
}
