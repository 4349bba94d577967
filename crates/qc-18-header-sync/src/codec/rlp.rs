//! Canonical RLP encoding of headers.

use crate::domain::{Bloom, BlockNonce, DecodeError, SourceHeader, BLOOM_SIZE};
use ::rlp::{DecoderError, Rlp, RlpStream};

/// Items before the seal fields.
const SEAL_FIELDS_OFFSET: usize = 13;
/// Item count without and with the London base fee.
const LEGACY_ITEMS: usize = 15;
const LONDON_ITEMS: usize = 16;

fn rlp_err(e: DecoderError) -> DecodeError {
    DecodeError::Rlp(e.to_string())
}

fn append_unsealed(stream: &mut RlpStream, header: &SourceHeader) {
    stream.append(&header.parent_hash);
    stream.append(&header.uncle_hash);
    stream.append(&header.coinbase);
    stream.append(&header.state_root);
    stream.append(&header.transactions_root);
    stream.append(&header.receipts_root);
    stream.append(&header.logs_bloom.0.to_vec());
    stream.append(&header.difficulty);
    stream.append(&header.number);
    stream.append(&header.gas_limit);
    stream.append(&header.gas_used);
    stream.append(&header.timestamp);
    stream.append(&header.extra_data);
}

/// Full canonical encoding, the preimage of the content hash.
pub fn encode_rlp(header: &SourceHeader) -> Vec<u8> {
    let items = if header.base_fee.is_some() {
        LONDON_ITEMS
    } else {
        LEGACY_ITEMS
    };
    let mut stream = RlpStream::new_list(items);
    append_unsealed(&mut stream, header);
    stream.append(&header.mix_digest);
    stream.append(&header.nonce.0.to_vec());
    if let Some(base_fee) = &header.base_fee {
        stream.append(base_fee);
    }
    stream.out().to_vec()
}

/// Encoding without `mix_digest` and `nonce`, the preimage of the seal hash.
pub fn encode_seal_fields(header: &SourceHeader) -> Vec<u8> {
    let items = if header.base_fee.is_some() {
        SEAL_FIELDS_OFFSET + 1
    } else {
        SEAL_FIELDS_OFFSET
    };
    let mut stream = RlpStream::new_list(items);
    append_unsealed(&mut stream, header);
    if let Some(base_fee) = &header.base_fee {
        stream.append(base_fee);
    }
    stream.out().to_vec()
}

/// Decode a canonical RLP header.
///
/// Non-canonical encodings are rejected so that the bytes a relayer submits
/// are exactly the bytes the content hash covers.
pub fn decode_rlp(raw: &[u8]) -> Result<SourceHeader, DecodeError> {
    let rlp = Rlp::new(raw);
    let info = rlp.payload_info().map_err(rlp_err)?;
    if info.total() < raw.len() {
        return Err(DecodeError::TrailingBytes(raw.len() - info.total()));
    }
    if !rlp.is_list() {
        return Err(DecodeError::Rlp("header is not a list".to_string()));
    }

    let count = rlp.item_count().map_err(rlp_err)?;
    if count != LEGACY_ITEMS && count != LONDON_ITEMS {
        return Err(DecodeError::ItemCount(count));
    }

    let bloom: Vec<u8> = rlp.val_at(6).map_err(rlp_err)?;
    let logs_bloom: [u8; BLOOM_SIZE] =
        bloom.as_slice().try_into().map_err(|_| DecodeError::Length {
            field: "logsBloom",
            expected: BLOOM_SIZE,
            actual: bloom.len(),
        })?;

    let nonce: Vec<u8> = rlp.val_at(14).map_err(rlp_err)?;
    let nonce: [u8; 8] = nonce.as_slice().try_into().map_err(|_| DecodeError::Length {
        field: "nonce",
        expected: 8,
        actual: nonce.len(),
    })?;

    let header = SourceHeader {
        parent_hash: rlp.val_at(0).map_err(rlp_err)?,
        uncle_hash: rlp.val_at(1).map_err(rlp_err)?,
        coinbase: rlp.val_at(2).map_err(rlp_err)?,
        state_root: rlp.val_at(3).map_err(rlp_err)?,
        transactions_root: rlp.val_at(4).map_err(rlp_err)?,
        receipts_root: rlp.val_at(5).map_err(rlp_err)?,
        logs_bloom: Bloom(logs_bloom),
        difficulty: rlp.val_at(7).map_err(rlp_err)?,
        number: rlp.val_at(8).map_err(rlp_err)?,
        gas_limit: rlp.val_at(9).map_err(rlp_err)?,
        gas_used: rlp.val_at(10).map_err(rlp_err)?,
        timestamp: rlp.val_at(11).map_err(rlp_err)?,
        extra_data: rlp.val_at(12).map_err(rlp_err)?,
        mix_digest: rlp.val_at(13).map_err(rlp_err)?,
        nonce: BlockNonce(nonce),
        base_fee: if count == LONDON_ITEMS {
            Some(rlp.val_at(15).map_err(rlp_err)?)
        } else {
            None
        },
    };

    if encode_rlp(&header) != raw {
        return Err(DecodeError::Rlp("non-canonical encoding".to_string()));
    }

    Ok(header)
}
