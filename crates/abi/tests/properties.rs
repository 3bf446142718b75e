//! Property-based checks for the testable invariants in SPEC_FULL.md §8.

use abifuzz_abi::encode::{encode_dyn_bytes, pad32};
use proptest::prelude::*;

proptest! {
    /// Invariant 3: a dynamic packer's output is always `32 + 32*ceil(len/32)`.
    #[test]
    fn dyn_bytes_length_is_32_plus_padded_payload(len in 0usize..300) {
        let payload = vec![0xABu8; len];
        let encoded = encode_dyn_bytes(&payload);
        prop_assert_eq!(encoded.len(), 32 + pad32(len));
        prop_assert_eq!(encoded.len() % 32, 0);
    }
}
