//! Permutation kernels.
//!
//! Rows hold distinct integers drawn from a shared range `[lb, ub]`. The
//! range may be wider than the row, so a row is a partial permutation in
//! general; every kernel keeps values distinct.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

use crate::random::EvoRng;
use rand::Rng;

/// Value lookup over a permutation range.
struct Slots {
    lb: i64,
    used: Vec<bool>,
}

impl Slots {
    fn new(lb: i64, ub: i64) -> Self {
        Self {
            lb,
            used: vec![false; (ub - lb + 1).max(0) as usize],
        }
    }

    fn slot(&self, v: i64) -> usize {
        (v - self.lb) as usize
    }

    fn contains(&self, v: i64) -> bool {
        self.used[self.slot(v)]
    }

    fn insert(&mut self, v: i64) {
        let s = self.slot(v);
        self.used[s] = true;
    }
}

/// Order crossover (OX): keeps a segment of `template`, fills the rest with
/// `donor` values in their cyclic order starting after the segment.
pub(crate) fn ox_child(
    template: &[i64],
    donor: &[i64],
    start: usize,
    end: usize,
    range: (i64, i64),
) -> Vec<i64> {
    let n = template.len();
    let mut child = vec![0; n];
    let mut taken = Slots::new(range.0, range.1);

    for i in start..=end {
        child[i] = template[i];
        taken.insert(template[i]);
    }

    let mut pos = (end + 1) % n;
    let mut filled = end - start + 1;
    for offset in 0..n {
        if filled == n {
            break;
        }
        let val = donor[(end + 1 + offset) % n];
        if !taken.contains(val) {
            child[pos] = val;
            taken.insert(val);
            pos = (pos + 1) % n;
            filled += 1;
        }
    }
    // Partial permutations: donor may not cover the gap.
    for offset in 0..n {
        if filled == n {
            break;
        }
        let val = template[(end + 1 + offset) % n];
        if !taken.contains(val) {
            child[pos] = val;
            taken.insert(val);
            pos = (pos + 1) % n;
            filled += 1;
        }
    }
    child
}

/// Partially mapped crossover (PMX): keeps a segment of `template` and
/// places the displaced `donor` values through the segment mapping.
pub(crate) fn pmx_child(
    template: &[i64],
    donor: &[i64],
    start: usize,
    end: usize,
    range: (i64, i64),
) -> Vec<i64> {
    let n = template.len();
    let mut child: Vec<Option<i64>> = vec![None; n];
    let mut placed = Slots::new(range.0, range.1);

    let mut donor_pos = vec![None; placed.used.len()];
    for (i, &v) in donor.iter().enumerate() {
        donor_pos[placed.slot(v)] = Some(i);
    }

    for i in start..=end {
        child[i] = Some(template[i]);
        placed.insert(template[i]);
    }

    for i in start..=end {
        let donor_val = donor[i];
        if placed.contains(donor_val) {
            continue;
        }
        let mut pos = i;
        // Chain through the segment; a value missing from the donor ends it.
        while let Some(p) = donor_pos[placed.slot(template[pos])] {
            if p < start || p > end {
                if child[p].is_none() {
                    child[p] = Some(donor_val);
                    placed.insert(donor_val);
                }
                break;
            }
            pos = p;
        }
    }

    for i in 0..n {
        if child[i].is_none() && !placed.contains(donor[i]) {
            child[i] = Some(donor[i]);
            placed.insert(donor[i]);
        }
    }

    let mut spare = Vec::new();
    for &v in donor.iter().chain(template) {
        if !placed.contains(v) {
            placed.insert(v);
            spare.push(v);
        }
    }
    let mut spare = spare.into_iter();
    // Enough spare values exist: template alone holds n distinct values.
    child
        .into_iter()
        .map(|slot| slot.or_else(|| spare.next()).unwrap_or(range.0))
        .collect()
}

/// Exchanges two random positions.
pub(crate) fn swap(perm: &mut [i64], rng: &mut EvoRng) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let i = rng.random_range(0..n);
    let j = rng.random_range(0..n);
    perm.swap(i, j);
}

/// Reverses a random segment (2-opt move).
pub(crate) fn invert(perm: &mut [i64], rng: &mut EvoRng) {
    let n = perm.len();
    if n < 2 {
        return;
    }
    let (start, end) = random_segment(n, rng);
    perm[start..=end].reverse();
}

/// Pick a random segment `[start, end]` within `0..n` where `start <= end`.
pub(crate) fn random_segment(n: usize, rng: &mut EvoRng) -> (usize, usize) {
    let a = rng.random_range(0..n);
    let b = rng.random_range(0..n);
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    fn is_distinct(v: &[i64]) -> bool {
        let mut s = v.to_vec();
        s.sort_unstable();
        s.dedup();
        s.len() == v.len()
    }

    #[test]
    fn test_ox_full_permutation() {
        let p1 = [0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = [7, 6, 5, 4, 3, 2, 1, 0];
        let child = ox_child(&p1, &p2, 2, 4, (0, 7));
        assert_eq!(&child[2..=4], &[2, 3, 4]);
        // Fill starts after the segment with donor order 2,1,0,7,6,...
        assert_eq!(child, vec![6, 5, 2, 3, 4, 1, 0, 7]);
    }

    #[test]
    fn test_pmx_full_permutation() {
        let p1 = [1, 2, 3, 4, 5, 6, 7, 8];
        let p2 = [3, 7, 5, 1, 6, 8, 2, 4];
        let child = pmx_child(&p1, &p2, 3, 5, (1, 8));
        assert_eq!(&child[3..=5], &[4, 5, 6]);
        assert!(is_distinct(&child));
        assert_eq!(child, vec![3, 7, 8, 4, 5, 6, 2, 1]);
    }

    #[test]
    fn test_kernels_partial_permutation() {
        let mut rng = create_rng(42);
        let p1 = [10, 3, 7, 0];
        let p2 = [2, 9, 10, 4];
        for _ in 0..200 {
            let (s, e) = random_segment(4, &mut rng);
            let ox = ox_child(&p1, &p2, s, e, (0, 10));
            let pmx = pmx_child(&p1, &p2, s, e, (0, 10));
            assert!(is_distinct(&ox), "ox {ox:?}");
            assert!(is_distinct(&pmx), "pmx {pmx:?}");
            assert_eq!(&ox[s..=e], &p1[s..=e]);
            assert_eq!(&pmx[s..=e], &p1[s..=e]);
        }
    }

    #[test]
    fn test_swap_and_invert_keep_values() {
        let mut rng = create_rng(42);
        let mut perm: Vec<i64> = (0..10).collect();
        for _ in 0..50 {
            swap(&mut perm, &mut rng);
            invert(&mut perm, &mut rng);
        }
        let mut sorted = perm.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_element_untouched() {
        let mut rng = create_rng(42);
        let mut perm = vec![5];
        swap(&mut perm, &mut rng);
        invert(&mut perm, &mut rng);
        assert_eq!(perm, vec![5]);
    }
}
