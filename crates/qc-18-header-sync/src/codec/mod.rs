//! # Header Codec
//!
//! Turns relayer bytes into [`SourceHeader`] values and back, and computes
//! header identity.
//!
//! Decoding is structural only: lengths, hex, RLP shape. Consensus rules are
//! checked by the validator. Every path is integer-only and walks fields in a
//! fixed order, so identical input yields an identical header and hash on
//! every platform.

mod hex;
mod json;
mod rlp;

pub use self::json::{decode_json, encode_json};
pub use self::rlp::{decode_rlp, encode_rlp, encode_seal_fields};

use crate::domain::{DecodeError, SourceHeader};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Wire format of raw headers submitted for a chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderEncoding {
    /// Ethereum RPC JSON object.
    #[default]
    Json,
    /// Canonical RLP list.
    Rlp,
}

/// Decode a raw header in the given encoding.
///
/// # Errors
/// - `TooLarge` when `raw` exceeds `max_size`
/// - any structural [`DecodeError`] of the chosen format
pub fn decode(
    raw: &[u8],
    encoding: HeaderEncoding,
    max_size: usize,
) -> Result<SourceHeader, DecodeError> {
    if raw.len() > max_size {
        return Err(DecodeError::TooLarge {
            size: raw.len(),
            limit: max_size,
        });
    }

    match encoding {
        HeaderEncoding::Json => decode_json(raw),
        HeaderEncoding::Rlp => decode_rlp(raw),
    }
}

/// Encode a header in the given encoding.
pub fn encode(header: &SourceHeader, encoding: HeaderEncoding) -> Vec<u8> {
    match encoding {
        HeaderEncoding::Json => encode_json(header),
        HeaderEncoding::Rlp => encode_rlp(header),
    }
}

/// Keccak-256 digest.
#[inline]
pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// Header identity: Keccak-256 of the full canonical RLP encoding.
pub fn content_hash(header: &SourceHeader) -> H256 {
    keccak256(&encode_rlp(header))
}

/// Keccak-256 of the RLP encoding without `mix_digest` and `nonce`.
pub fn seal_hash(header: &SourceHeader) -> H256 {
    keccak256(&encode_seal_fields(header))
}
