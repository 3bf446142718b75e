//! The recursive packer and the head/tail argument encoder.
//!
//! [`encode_tuple`] is the one place the head/tail rule is written down;
//! it is used both for a method's top-level argument list and, recursively,
//! for the elements of any dynamic array or fixed array of dynamic
//! elements, since both shapes are "a tuple of typed values" underneath.

use alloy_primitives::U256;

use crate::encode::{
    encode_address, encode_bool, encode_dyn_bytes, encode_fixed_bytes, encode_function,
    encode_int256, encode_string, encode_uint256, EncodeError, WORD,
};
use crate::types::{Kind, TypeDescriptor};
use crate::value::Value;

/// Static byte width of `ty`, valid only when `!ty.is_dynamic()`.
pub fn static_size(ty: &TypeDescriptor) -> usize {
    match ty.kind() {
        Kind::FixedArray => ty.arity() as usize * static_size(ty.elem().expect("fixedArray has an element type")),
        _ => WORD,
    }
}

/// Packs a single static (non-dynamic) `(type, value)` pair.
fn pack_static(ty: &TypeDescriptor, val: &Value) -> Result<Vec<u8>, EncodeError> {
    match (ty.kind(), val) {
        (Kind::Uint, Value::Uint(v)) => Ok(encode_uint256(*v).to_vec()),
        (Kind::Int | Kind::Fixed, Value::Int(v)) => Ok(encode_int256(*v).to_vec()),
        (Kind::Bool, Value::Bool(v)) => Ok(encode_bool(*v).to_vec()),
        (Kind::Address, Value::Address(s)) => Ok(encode_address(s)?.to_vec()),
        (Kind::FixedBytes, Value::Bytes(b)) => Ok(encode_fixed_bytes(b, ty.width() as u8)?.to_vec()),
        (Kind::Function, Value::Function { address, selector }) => Ok(encode_function(address, *selector)?.to_vec()),
        (Kind::FixedArray, Value::Array(items)) => {
            let elem_ty = ty.elem().expect("fixedArray has an element type");
            if items.len() as i64 != ty.arity() {
                return Err(EncodeError::ArityMismatch { got: items.len(), expected: ty.arity() });
            }
            let mut out = Vec::with_capacity(static_size(ty));
            for item in items {
                out.extend_from_slice(&pack_static(elem_ty, item)?);
            }
            Ok(out)
        }
        _ => Err(EncodeError::TypeMismatch { ty: ty.canonical().to_owned() }),
    }
}

/// Packs a single dynamic `(type, value)` pair into its tail payload (the
/// bytes that a head-region offset points at).
fn pack_dynamic(ty: &TypeDescriptor, val: &Value) -> Result<Vec<u8>, EncodeError> {
    match (ty.kind(), val) {
        (Kind::String, Value::Str(s)) => Ok(encode_string(s)),
        (Kind::DynBytes, Value::Bytes(b)) => Ok(encode_dyn_bytes(b)),
        (Kind::DynArray, Value::Array(items)) => {
            let elem_ty = ty.elem().expect("dynArray has an element type");
            let items_tuple: Vec<(TypeDescriptor, Value)> =
                items.iter().map(|v| (elem_ty.clone(), v.clone())).collect();
            let mut out = encode_uint256(U256::from(items.len())).to_vec();
            out.extend_from_slice(&encode_tuple(&items_tuple)?);
            Ok(out)
        }
        (Kind::FixedArray, Value::Array(items)) => {
            // Dynamic only because the element type is dynamic; no length
            // prefix, the arity is already fixed by the type.
            let elem_ty = ty.elem().expect("fixedArray has an element type");
            if items.len() as i64 != ty.arity() {
                return Err(EncodeError::ArityMismatch { got: items.len(), expected: ty.arity() });
            }
            let items_tuple: Vec<(TypeDescriptor, Value)> =
                items.iter().map(|v| (elem_ty.clone(), v.clone())).collect();
            encode_tuple(&items_tuple)
        }
        _ => Err(EncodeError::TypeMismatch { ty: ty.canonical().to_owned() }),
    }
}

fn pack(ty: &TypeDescriptor, val: &Value) -> Result<Vec<u8>, EncodeError> {
    if ty.is_dynamic() {
        pack_dynamic(ty, val)
    } else {
        pack_static(ty, val)
    }
}

/// The Argument Encoder: given an ordered list of `(type, value)` pairs,
/// emits the canonical head-then-tail layout. Also used recursively to
/// pack the elements of a dynamic array or a fixed array of dynamic
/// elements, since those are structurally identical to a top-level
/// argument list.
pub fn encode_tuple(items: &[(TypeDescriptor, Value)]) -> Result<Vec<u8>, EncodeError> {
    let head_size: usize = items.iter().map(|(ty, _)| if ty.is_dynamic() { WORD } else { static_size(ty) }).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();
    for (ty, val) in items {
        if ty.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend_from_slice(&encode_uint256(U256::from(offset)));
            tail.extend_from_slice(&pack(ty, val)?);
        } else {
            head.extend_from_slice(&pack(ty, val)?);
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(s: &str) -> TypeDescriptor {
        TypeDescriptor::parse(s).unwrap()
    }

    /// Solidity ABI spec example: `baz(uint32,bool)` with `(69, true)`.
    #[test]
    fn scenario_s1_baz_uint32_bool() {
        let items = vec![
            (ty("uint32"), Value::Uint(U256::from(69u32))),
            (ty("bool"), Value::Bool(true)),
        ];
        let encoded = encode_tuple(&items).unwrap();
        let expected = format!(
            "{}{}",
            "0000000000000000000000000000000000000000000000000000000000000045",
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(hex::encode(encoded), expected);
    }

    /// `bar(bytes3[2])` with `(["abc", "def"])` — no offset: fully static.
    #[test]
    fn scenario_s2_bar_bytes3_fixed_array_is_static() {
        let items = vec![(
            ty("bytes3[2]"),
            Value::Array(vec![Value::Bytes(b"abc".to_vec()), Value::Bytes(b"def".to_vec())]),
        )];
        let encoded = encode_tuple(&items).unwrap();
        assert_eq!(encoded.len(), 64);
        let expected = format!("{}{}", hex::encode(b"abc"), "0".repeat(58)) + &format!("{}{}", hex::encode(b"def"), "0".repeat(58));
        assert_eq!(hex::encode(&encoded), expected);
    }

    /// `sam(bytes,bool,uint256[])` with `("dave", true, [1,2,3])`.
    #[test]
    fn scenario_s3_sam_mixed_dynamic() {
        let items = vec![
            (ty("bytes"), Value::Bytes(b"dave".to_vec())),
            (ty("bool"), Value::Bool(true)),
            (
                ty("uint256[]"),
                Value::Array(vec![
                    Value::Uint(U256::from(1u8)),
                    Value::Uint(U256::from(2u8)),
                    Value::Uint(U256::from(3u8)),
                ]),
            ),
        ];
        let encoded = encode_tuple(&items).unwrap();
        // head: offset(0x60), bool(1), offset(0xa0)
        assert_eq!(&hex::encode(&encoded[0..32])[56..], "0000000000000060");
        assert_eq!(&hex::encode(&encoded[32..64])[56..], "0000000000000001");
        assert_eq!(&hex::encode(&encoded[64..96])[56..], "00000000000000a0");
        // tail: "dave" length-prefixed at offset 0x60
        assert_eq!(&hex::encode(&encoded[96..128])[56..], "0000000000000004");
        // tail: uint256[] length then 1,2,3 at offset 0xa0
        let arr_off = 0xa0;
        assert_eq!(&hex::encode(&encoded[arr_off..arr_off + 32])[56..], "0000000000000003");
    }

    #[test]
    fn fixed_array_of_strings_is_head_tail_without_length() {
        let items = vec![(
            ty("string[2]"),
            Value::Array(vec![Value::Str("a".into()), Value::Str("bb".into())]),
        )];
        let encoded = encode_tuple(&items).unwrap();
        // local head is 2 * 32 = 64 bytes of offsets, no length prefix.
        assert_eq!(&hex::encode(&encoded[0..32])[56..], "0000000000000040");
    }

    #[test]
    fn arity_mismatch_is_rejected() {
        let items = vec![(ty("bytes3[2]"), Value::Array(vec![Value::Bytes(b"abc".to_vec())]))];
        assert!(matches!(encode_tuple(&items), Err(EncodeError::ArityMismatch { .. })));
    }
}
