//! Byte-level primitive encoders for the canonical 32-byte-word ABI layout.
//!
//! Each function here consumes a typed value and returns exactly 32 bytes,
//! except [`encode_dyn_bytes`] which returns `32 * (1 + ceil(len / 32))`
//! bytes (length word plus the right-padded payload).

use alloy_primitives::U256;
use thiserror::Error;

pub const WORD: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("value does not fit in 256 bits")]
    Overflow,
    #[error("invalid address hex string `{0}`")]
    InvalidAddress(String),
    #[error("invalid boolean literal `{0}`")]
    InvalidBool(String),
    #[error("invalid hex string `{0}`")]
    InvalidHex(String),
    #[error("fixed-bytes value of length {len} does not fit in bytes{n}")]
    FixedBytesTooLong { len: usize, n: u8 },
    #[error("array value has {got} elements, type declares arity {expected}")]
    ArityMismatch { got: usize, expected: i64 },
    #[error("method called with {got} arguments, expected {expected}")]
    ArgCountMismatch { got: usize, expected: usize },
    #[error("value shape does not match declared type `{ty}`")]
    TypeMismatch { ty: String },
}

/// A parsed two's-complement signed integer, kept as a sign flag plus an
/// unsigned magnitude rather than a dedicated wide-signed type: the two's
/// complement bit pattern is just `!magnitude + 1`, so no separate signed
/// arithmetic type is needed to get sign extension right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Int256 {
    pub negative: bool,
    pub magnitude: U256,
}

impl Int256 {
    pub fn from_i128(v: i128) -> Self {
        if v < 0 {
            Self { negative: true, magnitude: U256::from(v.unsigned_abs()) }
        } else {
            Self { negative: false, magnitude: U256::from(v as u128) }
        }
    }

    pub fn zero() -> Self {
        Self { negative: false, magnitude: U256::ZERO }
    }
}

pub fn encode_uint256(v: U256) -> [u8; WORD] {
    v.to_be_bytes()
}

/// Sign-extends negatives via the `0xFF` two's-complement pattern that
/// falls out of `!magnitude + 1` automatically.
pub fn encode_int256(v: Int256) -> [u8; WORD] {
    if !v.negative || v.magnitude.is_zero() {
        v.magnitude.to_be_bytes()
    } else {
        let twos_complement = (!v.magnitude).wrapping_add(U256::from(1u8));
        twos_complement.to_be_bytes()
    }
}

pub fn encode_bool(v: bool) -> [u8; WORD] {
    let mut out = [0u8; WORD];
    if v {
        out[WORD - 1] = 1;
    }
    out
}

/// Accepts only the case-sensitive literals `"true"`/`"false"`.
pub fn parse_bool_literal(s: &str) -> Result<bool, EncodeError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(EncodeError::InvalidBool(other.to_owned())),
    }
}

pub fn encode_address(hex_str: &str) -> Result<[u8; WORD], EncodeError> {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if stripped.len() != 40 || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EncodeError::InvalidAddress(hex_str.to_owned()));
    }
    let bytes = hex::decode(stripped).map_err(|_| EncodeError::InvalidAddress(hex_str.to_owned()))?;
    let mut out = [0u8; WORD];
    out[12..].copy_from_slice(&bytes);
    Ok(out)
}

pub fn encode_fixed_bytes(v: &[u8], n: u8) -> Result<[u8; WORD], EncodeError> {
    if n > 32 || v.len() > n as usize {
        return Err(EncodeError::FixedBytesTooLong { len: v.len(), n });
    }
    let mut out = [0u8; WORD];
    out[..v.len()].copy_from_slice(v);
    Ok(out)
}

/// `uint256(len) ++ v` right-padded to a 32-byte multiple.
pub fn encode_dyn_bytes(v: &[u8]) -> Vec<u8> {
    let padded_len = pad32(v.len());
    let mut out = Vec::with_capacity(WORD + padded_len);
    out.extend_from_slice(&encode_uint256(U256::from(v.len())));
    out.extend_from_slice(v);
    out.resize(WORD + padded_len, 0);
    out
}

pub fn encode_string(v: &str) -> Vec<u8> {
    encode_dyn_bytes(v.as_bytes())
}

/// 20-byte address concatenated with a 4-byte selector, right-padded into
/// the 32-byte word like any other fixed-bytes value.
pub fn encode_function(addr_hex: &str, selector: [u8; 4]) -> Result<[u8; WORD], EncodeError> {
    let stripped = addr_hex.strip_prefix("0x").unwrap_or(addr_hex);
    if stripped.len() != 40 || !stripped.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EncodeError::InvalidAddress(addr_hex.to_owned()));
    }
    let addr = hex::decode(stripped).map_err(|_| EncodeError::InvalidAddress(addr_hex.to_owned()))?;
    let mut out = [0u8; WORD];
    out[..20].copy_from_slice(&addr);
    out[20..24].copy_from_slice(&selector);
    Ok(out)
}

/// Rounds `len` up to the next multiple of 32 (`0` stays `0`).
pub fn pad32(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Parses a `uint` literal from either a native decimal string or a
/// `"0x…"` hex string; both paths must produce identical bytes.
pub fn parse_uint_literal(s: &str) -> Result<U256, EncodeError> {
    if let Some(digits) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        U256::from_str_radix(digits, 16).map_err(|_| EncodeError::Overflow)
    } else {
        U256::from_str_radix(s, 10).map_err(|_| EncodeError::Overflow)
    }
}

/// Parses a signed literal: an optional leading `-`, then a decimal or
/// `0x`-prefixed hex magnitude.
pub fn parse_int_literal(s: &str) -> Result<Int256, EncodeError> {
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = parse_uint_literal(rest)?;
    Ok(Int256 { negative: negative && !magnitude.is_zero(), magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint256_big_endian() {
        let v = parse_uint_literal("69").unwrap();
        let encoded = encode_uint256(v);
        assert_eq!(hex::encode(encoded), "0000000000000000000000000000000000000000000000000000000000000045");
    }

    #[test]
    fn uint256_decimal_and_hex_agree() {
        let decimal = parse_uint_literal("305441741").unwrap();
        let hex_form = parse_uint_literal("0x1234abcd").unwrap();
        assert_eq!(decimal, hex_form);
    }

    #[test]
    fn int256_negative_sign_extends_with_ff() {
        let minus_one = parse_int_literal("-1").unwrap();
        let encoded = encode_int256(minus_one);
        assert_eq!(hex::encode(encoded), "f".repeat(64));
    }

    #[test]
    fn int256_positive_matches_uint_encoding() {
        let v = parse_int_literal("42").unwrap();
        let encoded = encode_int256(v);
        assert_eq!(hex::encode(encoded), "000000000000000000000000000000000000000000000000000000000000002a");
    }

    #[test]
    fn bool_encodes_as_trailing_one_or_zero() {
        assert_eq!(encode_bool(true)[31], 1);
        assert_eq!(encode_bool(false), [0u8; 32]);
        assert_eq!(parse_bool_literal("true").unwrap(), true);
        assert_eq!(parse_bool_literal("false").unwrap(), false);
        assert!(parse_bool_literal("True").is_err());
    }

    #[test]
    fn address_requires_exactly_40_hex_digits() {
        let addr = "0000000000000000000000000000000000dEaD";
        assert!(encode_address(addr).is_ok());
        assert!(encode_address(&format!("0x{addr}")).is_ok());
        assert!(encode_address("dead").is_err());
        assert!(encode_address(&format!("{addr}ff")).is_err());
    }

    #[test]
    fn dyn_bytes_length_prefix_and_padding() {
        let encoded = encode_dyn_bytes(b"dave");
        assert_eq!(encoded.len(), 64);
        assert_eq!(hex::encode(&encoded[..32]), "0000000000000000000000000000000000000000000000000000000000000004");
        let expected_payload = format!("64617665{}", "0".repeat(56));
        assert_eq!(hex::encode(&encoded[32..]), expected_payload);
    }
}
