//! Per-type candidate generation: blends the seed pool with random
//! construction and type-specific boundary values (§4.5 of the design).

use abifuzz_abi::encode::Int256;
use abifuzz_abi::types::{Kind, TypeDescriptor};
use abifuzz_abi::value::Value;
use alloy_primitives::U256;
use rand::Rng;

use crate::seed_pool::SeedPool;

/// A random dynamic-array length is drawn from `[1, ARRAY_LIMIT]`.
pub const ARRAY_LIMIT: u64 = 10;

/// Random ASCII strings drawn by the generator are at most this long.
pub const STRING_MAX: usize = 64;

/// Generates up to `input_scale` candidate [`Value`]s for `ty`, blending
/// seed-pool entries, random draws, and type-specific boundary values.
/// Composite types recurse: `fixedArray[N]` draws N independent elements
/// per candidate, `dynArray` first picks a random length in
/// `[1, ARRAY_LIMIT]`.
pub fn generate_candidates<R: Rng + ?Sized>(ty: &TypeDescriptor, pool: &SeedPool, input_scale: usize, rng: &mut R) -> Vec<Value> {
    let mut out = match ty.kind() {
        Kind::Uint => uint_candidates(ty.width(), pool, rng),
        Kind::Int | Kind::Fixed => int_candidates(ty.width(), pool, rng),
        Kind::Bool => vec![Value::Bool(true), Value::Bool(false)],
        Kind::Address => address_candidates(pool, rng),
        Kind::String => string_candidates(pool, rng),
        Kind::FixedBytes => bytes_candidates(ty.width() as usize, pool, rng),
        Kind::DynBytes => dyn_bytes_candidates(pool, rng),
        Kind::Function => vec![function_candidate(rng)],
        Kind::FixedArray => fixed_array_candidates(ty, pool, input_scale, rng),
        Kind::DynArray => dyn_array_candidates(ty, pool, input_scale, rng),
    };
    out.truncate(input_scale.max(1));
    out
}

fn uint_candidates<R: Rng + ?Sized>(width: u16, pool: &SeedPool, rng: &mut R) -> Vec<Value> {
    let max = max_uint(width);
    let mut out: Vec<Value> = pool.uints().iter().filter_map(|s| parse_uint_seed(s)).map(Value::Uint).collect();
    out.push(Value::Uint(random_uint(width, rng)));
    out.push(Value::Uint(U256::ZERO));
    out.push(Value::Uint(U256::from(1u8)));
    out.push(Value::Uint(max - U256::from(1u8)));
    out.push(Value::Uint(max));
    out
}

fn int_candidates<R: Rng + ?Sized>(width: u16, pool: &SeedPool, rng: &mut R) -> Vec<Value> {
    let max_magnitude = max_int_magnitude(width);
    let mut out: Vec<Value> = pool.ints().iter().filter_map(|s| parse_int_seed(s)).map(Value::Int).collect();
    out.push(Value::Int(random_int(width, rng)));
    out.push(Value::Int(Int256::zero()));
    out.push(Value::Int(Int256 { negative: false, magnitude: U256::from(1u8) }));
    out.push(Value::Int(Int256 { negative: false, magnitude: max_magnitude.clone() - U256::from(1u8) }));
    out.push(Value::Int(Int256 { negative: false, magnitude: max_magnitude.clone() }));
    out.push(Value::Int(Int256 { negative: true, magnitude: U256::from(1u8) }));
    out.push(Value::Int(Int256 { negative: true, magnitude: max_magnitude + U256::from(1u8) }));
    out
}

fn address_candidates<R: Rng + ?Sized>(pool: &SeedPool, rng: &mut R) -> Vec<Value> {
    let mut out: Vec<Value> = pool.addresses().iter().cloned().map(Value::Address).collect();
    out.push(Value::Address(random_address(rng)));
    out
}

fn string_candidates<R: Rng + ?Sized>(pool: &SeedPool, rng: &mut R) -> Vec<Value> {
    let mut out: Vec<Value> = pool.strings().iter().cloned().map(Value::Str).collect();
    out.push(Value::Str(random_ascii(rng.random_range(0..=STRING_MAX), rng)));
    out
}

fn bytes_candidates<R: Rng + ?Sized>(n: usize, pool: &SeedPool, rng: &mut R) -> Vec<Value> {
    let mut out: Vec<Value> = pool
        .bytes1()
        .iter()
        .filter_map(|s| hex::decode(s.trim_start_matches("0x")).ok())
        .map(|mut b| {
            b.truncate(n);
            Value::Bytes(b)
        })
        .collect();
    out.push(Value::Bytes(random_bytes(n, rng)));
    out
}

fn dyn_bytes_candidates<R: Rng + ?Sized>(pool: &SeedPool, rng: &mut R) -> Vec<Value> {
    let mut out: Vec<Value> = pool
        .dyn_bytes()
        .iter()
        .filter_map(|s| hex::decode(s.trim_start_matches("0x")).ok())
        .map(Value::Bytes)
        .collect();
    out.push(Value::Bytes(random_bytes(rng.random_range(0..=STRING_MAX), rng)));
    out
}

fn function_candidate<R: Rng + ?Sized>(rng: &mut R) -> Value {
    let mut selector = [0u8; 4];
    rng.fill(&mut selector);
    Value::Function { address: random_address(rng), selector }
}

fn fixed_array_candidates<R: Rng + ?Sized>(ty: &TypeDescriptor, pool: &SeedPool, input_scale: usize, rng: &mut R) -> Vec<Value> {
    let elem = ty.elem().expect("fixedArray always has an element type");
    let arity = ty.arity().max(0) as usize;
    let count = input_scale.max(1);
    (0..count)
        .map(|_| {
            let elements = (0..arity)
                .map(|_| {
                    let candidates = generate_candidates(elem, pool, input_scale, rng);
                    pick_one(&candidates, rng)
                })
                .collect();
            Value::Array(elements)
        })
        .collect()
}

fn dyn_array_candidates<R: Rng + ?Sized>(ty: &TypeDescriptor, pool: &SeedPool, input_scale: usize, rng: &mut R) -> Vec<Value> {
    let elem = ty.elem().expect("dynArray always has an element type");
    let count = input_scale.max(1);
    (0..count)
        .map(|_| {
            let len = rng.random_range(1..=ARRAY_LIMIT) as usize;
            let elements = (0..len)
                .map(|_| {
                    let candidates = generate_candidates(elem, pool, input_scale, rng);
                    pick_one(&candidates, rng)
                })
                .collect();
            Value::Array(elements)
        })
        .collect()
}

fn pick_one<R: Rng + ?Sized>(candidates: &[Value], rng: &mut R) -> Value {
    let idx = rng.random_range(0..candidates.len().max(1)).min(candidates.len().saturating_sub(1));
    candidates.get(idx).cloned().unwrap_or(Value::Uint(U256::ZERO))
}

fn max_uint(width: u16) -> U256 {
    if width >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << width as usize) - U256::from(1u8)
    }
}

fn max_int_magnitude(width: u16) -> U256 {
    if width >= 256 {
        (U256::from(1u8) << 255usize) - U256::from(1u8)
    } else {
        (U256::from(1u8) << (width as usize - 1)) - U256::from(1u8)
    }
}

fn random_uint<R: Rng + ?Sized>(width: u16, rng: &mut R) -> U256 {
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    let v = U256::from_be_bytes(bytes);
    let max = max_uint(width);
    if max == U256::MAX {
        v
    } else {
        v % (max + U256::from(1u8))
    }
}

fn random_int<R: Rng + ?Sized>(width: u16, rng: &mut R) -> Int256 {
    let magnitude = random_uint(width.max(8) - 1, rng);
    Int256 { negative: rng.random_bool(0.5), magnitude }
}

fn random_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 20];
    rng.fill(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

fn random_bytes<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<u8> {
    let mut v = vec![0u8; len];
    rng.fill(v.as_mut_slice());
    v
}

fn random_ascii<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len).map(|_| CHARS[rng.random_range(0..CHARS.len())] as char).collect()
}

fn parse_uint_seed(s: &str) -> Option<U256> {
    if let Some(hex_str) = s.strip_prefix("0x") {
        U256::from_str_radix(hex_str, 16).ok()
    } else {
        U256::from_str_radix(s, 10).ok()
    }
}

fn parse_int_seed(s: &str) -> Option<Int256> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = parse_uint_seed(digits)?;
    Some(Int256 { negative, magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn uint_candidates_include_boundaries() {
        let pool = SeedPool::default();
        let candidates = generate_candidates(&TypeDescriptor::parse("uint8").unwrap(), &pool, 100, &mut rng());
        assert!(candidates.contains(&Value::Uint(U256::ZERO)));
        assert!(candidates.contains(&Value::Uint(U256::from(255u16))));
    }

    #[test]
    fn int_candidates_include_negative_one_and_min() {
        let pool = SeedPool::default();
        let candidates = generate_candidates(&TypeDescriptor::parse("int8").unwrap(), &pool, 100, &mut rng());
        assert!(candidates.iter().any(|v| matches!(v, Value::Int(i) if i.negative && i.magnitude == U256::from(1u8))));
    }

    #[test]
    fn dyn_array_length_respects_array_limit() {
        let pool = SeedPool::default();
        let ty = TypeDescriptor::parse("uint256[]").unwrap();
        for candidate in generate_candidates(&ty, &pool, 20, &mut rng()) {
            let Value::Array(elems) = candidate else { panic!("expected array") };
            assert!((1..=ARRAY_LIMIT as usize).contains(&elems.len()));
        }
    }

    #[test]
    fn fixed_array_respects_arity() {
        let pool = SeedPool::default();
        let ty = TypeDescriptor::parse("uint256[3]").unwrap();
        for candidate in generate_candidates(&ty, &pool, 5, &mut rng()) {
            let Value::Array(elems) = candidate else { panic!("expected array") };
            assert_eq!(elems.len(), 3);
        }
    }

    #[test]
    fn candidate_count_is_bounded_by_input_scale() {
        let pool = SeedPool::default();
        let ty = TypeDescriptor::parse("uint256").unwrap();
        let candidates = generate_candidates(&ty, &pool, 2, &mut rng());
        assert!(candidates.len() <= 2);
    }
}
