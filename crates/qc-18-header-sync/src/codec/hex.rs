//! Hex field parsing for the JSON wire format.
//!
//! Quantities follow the Ethereum RPC rules: `0x` prefix, no leading zeros,
//! `0x0` for zero. Data fields are `0x`-prefixed with an even digit count.

use crate::domain::DecodeError;
use primitive_types::U256;

fn strip_prefix<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DecodeError> {
    value.strip_prefix("0x").ok_or_else(|| DecodeError::Hex {
        field,
        reason: "missing 0x prefix".to_string(),
    })
}

fn check_quantity<'a>(field: &'static str, value: &'a str) -> Result<&'a str, DecodeError> {
    let digits = strip_prefix(field, value)?;
    if digits.is_empty() {
        return Err(DecodeError::Hex {
            field,
            reason: "empty quantity".to_string(),
        });
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(DecodeError::Hex {
            field,
            reason: "leading zero".to_string(),
        });
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::Hex {
            field,
            reason: "non-hex digit".to_string(),
        });
    }
    Ok(digits)
}

pub(super) fn parse_u64(field: &'static str, value: &str) -> Result<u64, DecodeError> {
    let digits = check_quantity(field, value)?;
    u64::from_str_radix(digits, 16).map_err(|e| DecodeError::Hex {
        field,
        reason: e.to_string(),
    })
}

pub(super) fn parse_u256(field: &'static str, value: &str) -> Result<U256, DecodeError> {
    let digits = check_quantity(field, value)?;
    if digits.len() > 64 {
        return Err(DecodeError::Hex {
            field,
            reason: "quantity exceeds 256 bits".to_string(),
        });
    }
    U256::from_str_radix(digits, 16).map_err(|e| DecodeError::Hex {
        field,
        reason: format!("{e:?}"),
    })
}

pub(super) fn parse_bytes(field: &'static str, value: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = strip_prefix(field, value)?;
    ::hex::decode(digits).map_err(|e| DecodeError::Hex {
        field,
        reason: e.to_string(),
    })
}

pub(super) fn parse_fixed<const N: usize>(
    field: &'static str,
    value: &str,
) -> Result<[u8; N], DecodeError> {
    let bytes = parse_bytes(field, value)?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::Length {
            field,
            expected: N,
            actual: bytes.len(),
        })
}

pub(super) fn format_u64(value: u64) -> String {
    format!("{value:#x}")
}

pub(super) fn format_u256(value: U256) -> String {
    format!("{value:#x}")
}

pub(super) fn format_bytes(bytes: &[u8]) -> String {
    format!("0x{}", ::hex::encode(bytes))
}
