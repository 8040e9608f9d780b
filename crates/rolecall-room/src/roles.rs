//! Role dealing: uniform random permutations of the fixed role list.

use rand::Rng;
use rand::seq::SliceRandom;
use rolecall_protocol::Role;

/// Returns a uniformly random permutation of `roles`.
///
/// Fisher–Yates via [`SliceRandom::shuffle`]; every ordering is equally
/// likely and calls are independent of each other.
pub fn shuffle<R: Rng + ?Sized>(roles: &[Role], rng: &mut R) -> Vec<Role> {
    let mut dealt = roles.to_vec();
    dealt.shuffle(rng);
    dealt
}

/// Shuffles the first `count` roles of [`Role::ALL`].
///
/// `count` above the role count deals every role once.
pub fn deal<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Role> {
    let count = count.min(Role::ALL.len());
    shuffle(&Role::ALL[..count], rng)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let mut dealt = shuffle(&Role::ALL, &mut rng);
            assert_eq!(dealt.len(), 5);
            dealt.sort_by_key(|r| Role::ALL.iter().position(|x| x == r));
            assert_eq!(dealt, Role::ALL);
        }
    }

    #[test]
    fn test_deal_uses_prefix_of_role_list() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in 0..=5 {
            let dealt: HashSet<Role> = deal(n, &mut rng).into_iter().collect();
            let expected: HashSet<Role> = Role::ALL[..n].iter().copied().collect();
            assert_eq!(dealt, expected, "n = {n}");
        }
    }

    #[test]
    fn test_deal_caps_at_role_count() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(deal(9, &mut rng).len(), 5);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        // 3 roles → 6 orderings; each should land near 1/6 of draws.
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 6_000;
        let mut counts: HashMap<Vec<Role>, usize> = HashMap::new();
        for _ in 0..trials {
            *counts.entry(deal(3, &mut rng)).or_default() += 1;
        }
        assert_eq!(counts.len(), 6);
        for (ordering, count) in counts {
            assert!(
                (800..=1200).contains(&count),
                "{ordering:?} drawn {count} times"
            );
        }
    }
}
