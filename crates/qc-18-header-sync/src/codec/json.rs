//! Ethereum RPC JSON header format, as produced by relayers.

use super::hex::{
    format_bytes, format_u256, format_u64, parse_bytes, parse_fixed, parse_u256, parse_u64,
};
use crate::domain::{Bloom, BlockNonce, DecodeError, SourceHeader};
use primitive_types::{H160, H256};
use serde::{Deserialize, Serialize};

/// Wire shape. Every value stays a string until parsed field by field.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcHeader {
    parent_hash: String,
    #[serde(rename = "sha3Uncles")]
    uncle_hash: String,
    #[serde(rename = "miner")]
    coinbase: String,
    state_root: String,
    transactions_root: String,
    receipts_root: String,
    logs_bloom: String,
    difficulty: String,
    number: String,
    gas_limit: String,
    gas_used: String,
    timestamp: String,
    extra_data: String,
    mix_hash: String,
    nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_fee_per_gas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

impl TryFrom<RpcHeader> for SourceHeader {
    type Error = DecodeError;

    fn try_from(rpc: RpcHeader) -> Result<Self, Self::Error> {
        Ok(SourceHeader {
            parent_hash: H256(parse_fixed("parentHash", &rpc.parent_hash)?),
            uncle_hash: H256(parse_fixed("sha3Uncles", &rpc.uncle_hash)?),
            coinbase: H160(parse_fixed("miner", &rpc.coinbase)?),
            state_root: H256(parse_fixed("stateRoot", &rpc.state_root)?),
            transactions_root: H256(parse_fixed("transactionsRoot", &rpc.transactions_root)?),
            receipts_root: H256(parse_fixed("receiptsRoot", &rpc.receipts_root)?),
            logs_bloom: Bloom(parse_fixed("logsBloom", &rpc.logs_bloom)?),
            difficulty: parse_u256("difficulty", &rpc.difficulty)?,
            number: parse_u64("number", &rpc.number)?,
            gas_limit: parse_u64("gasLimit", &rpc.gas_limit)?,
            gas_used: parse_u64("gasUsed", &rpc.gas_used)?,
            timestamp: parse_u64("timestamp", &rpc.timestamp)?,
            extra_data: parse_bytes("extraData", &rpc.extra_data)?,
            mix_digest: H256(parse_fixed("mixHash", &rpc.mix_hash)?),
            nonce: BlockNonce(parse_fixed("nonce", &rpc.nonce)?),
            base_fee: rpc
                .base_fee_per_gas
                .as_deref()
                .map(|fee| parse_u256("baseFeePerGas", fee))
                .transpose()?,
        })
    }
}

impl From<&SourceHeader> for RpcHeader {
    fn from(header: &SourceHeader) -> Self {
        Self {
            parent_hash: format_bytes(header.parent_hash.as_bytes()),
            uncle_hash: format_bytes(header.uncle_hash.as_bytes()),
            coinbase: format_bytes(header.coinbase.as_bytes()),
            state_root: format_bytes(header.state_root.as_bytes()),
            transactions_root: format_bytes(header.transactions_root.as_bytes()),
            receipts_root: format_bytes(header.receipts_root.as_bytes()),
            logs_bloom: format_bytes(&header.logs_bloom.0),
            difficulty: format_u256(header.difficulty),
            number: format_u64(header.number),
            gas_limit: format_u64(header.gas_limit),
            gas_used: format_u64(header.gas_used),
            timestamp: format_u64(header.timestamp),
            extra_data: format_bytes(&header.extra_data),
            mix_hash: format_bytes(header.mix_digest.as_bytes()),
            nonce: format_bytes(&header.nonce.0),
            base_fee_per_gas: header.base_fee.map(format_u256),
            hash: Some(format_bytes(header.hash().as_bytes())),
        }
    }
}

/// Decode a JSON header.
///
/// A `hash` member, when present, must match the computed content hash.
pub fn decode_json(raw: &[u8]) -> Result<SourceHeader, DecodeError> {
    let rpc: RpcHeader =
        serde_json::from_slice(raw).map_err(|e| DecodeError::Json(e.to_string()))?;
    let declared = rpc
        .hash
        .as_deref()
        .map(|hash| parse_fixed::<32>("hash", hash).map(H256))
        .transpose()?;

    let header = SourceHeader::try_from(rpc)?;
    if let Some(declared) = declared {
        let computed = header.hash();
        if declared != computed {
            return Err(DecodeError::HashMismatch { declared, computed });
        }
    }
    Ok(header)
}

/// Encode a header as a JSON object, including its `hash`.
pub fn encode_json(header: &SourceHeader) -> Vec<u8> {
    // Only string fields, serialization cannot fail.
    serde_json::to_vec(&RpcHeader::from(header)).unwrap_or_default()
}
