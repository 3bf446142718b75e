//! The combination engine (§4.6): expands per-argument candidate sets into
//! a bounded set of argument tuples via a truncated Cartesian product.

use abifuzz_abi::value::Value;
use rand::seq::SliceRandom;
use rand::Rng;

/// After the third argument position, any candidate set wider than 2 is
/// downsampled to exactly 2 uniformly random picks before multiplying, to
/// bound explosion in wide ABIs.
const DOWNSAMPLE_AFTER_POSITION: usize = 3;
const DOWNSAMPLE_TO: usize = 2;

/// Combines per-argument candidate sets `s1, …, sn` into argument tuples.
///
/// Positions are 1-indexed per the design: after position 3, any set with
/// more than 2 candidates is downsampled to 2 before the product step. If
/// the resulting tuple count exceeds `fuzz_scale`, the set is sampled down
/// to `fuzz_scale` without replacement.
pub fn combine<R: Rng + ?Sized>(candidate_sets: &[Vec<Value>], fuzz_scale: usize, rng: &mut R) -> Vec<Vec<Value>> {
    if candidate_sets.is_empty() {
        return vec![Vec::new()];
    }

    let mut tuples: Vec<Vec<Value>> = candidate_sets[0].iter().map(|v| vec![v.clone()]).collect();

    for (idx, set) in candidate_sets.iter().enumerate().skip(1) {
        let position = idx + 1;
        let effective_set: Vec<Value> = if position > DOWNSAMPLE_AFTER_POSITION && set.len() > DOWNSAMPLE_TO {
            let mut pool: Vec<&Value> = set.iter().collect();
            pool.shuffle(rng);
            pool.into_iter().take(DOWNSAMPLE_TO).cloned().collect()
        } else {
            set.clone()
        };

        if effective_set.is_empty() {
            return Vec::new();
        }

        let mut next = Vec::with_capacity(tuples.len() * effective_set.len());
        for tuple in &tuples {
            for value in &effective_set {
                let mut extended = tuple.clone();
                extended.push(value.clone());
                next.push(extended);
            }
        }
        tuples = next;
    }

    if tuples.len() > fuzz_scale && fuzz_scale > 0 {
        tuples.shuffle(rng);
        tuples.truncate(fuzz_scale);
    }

    tuples
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn uints(vals: &[u64]) -> Vec<Value> {
        vals.iter().map(|v| Value::Uint(U256::from(*v))).collect()
    }

    #[test]
    fn single_argument_yields_one_tuple_per_candidate() {
        let sets = vec![uints(&[1, 2, 3])];
        let tuples = combine(&sets, 100, &mut StdRng::seed_from_u64(1));
        assert_eq!(tuples.len(), 3);
    }

    #[test]
    fn product_grows_across_positions_before_downsample_cutoff() {
        let sets = vec![uints(&[1, 2]), uints(&[1, 2])];
        let tuples = combine(&sets, 100, &mut StdRng::seed_from_u64(1));
        assert_eq!(tuples.len(), 4);
    }

    #[test]
    fn positions_after_third_downsample_wide_sets_to_two() {
        let sets = vec![uints(&[1]), uints(&[1]), uints(&[1]), uints(&[1, 2, 3, 4, 5])];
        let tuples = combine(&sets, 1000, &mut StdRng::seed_from_u64(1));
        // position 4 downsamples its 5-candidate set to 2 before multiplying.
        assert_eq!(tuples.len(), 2);
    }

    #[test]
    fn final_tuple_count_never_exceeds_fuzz_scale() {
        let sets = vec![uints(&[1, 2, 3]), uints(&[1, 2, 3])];
        let tuples = combine(&sets, 3, &mut StdRng::seed_from_u64(1));
        assert!(tuples.len() <= 3);
    }

    #[test]
    fn empty_candidate_set_in_the_lead_position_yields_no_tuples() {
        let sets: Vec<Vec<Value>> = vec![Vec::new()];
        let tuples = combine(&sets, 100, &mut StdRng::seed_from_u64(1));
        assert!(tuples.is_empty());
    }

    #[test]
    fn zero_arity_method_yields_a_single_empty_tuple() {
        let sets: Vec<Vec<Value>> = Vec::new();
        let tuples = combine(&sets, 100, &mut StdRng::seed_from_u64(1));
        assert_eq!(tuples, vec![Vec::new()]);
    }
}
