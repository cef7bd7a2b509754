//! Order crossover (OX) over item permutations.

use crate::rng::RandomNumberGenerator;

/// Builds a child from two parent permutations of equal length.
///
/// Two distinct cut points are drawn from `0..=n` and ordered, then the
/// child is assembled by [`order_crossover_at`]. Parents shorter than two
/// items are returned as a copy of `parent_a`.
pub fn order_crossover(
    parent_a: &[usize],
    parent_b: &[usize],
    rng: &mut RandomNumberGenerator,
) -> Vec<usize> {
    let n = parent_a.len();
    debug_assert_eq!(n, parent_b.len(), "parents must have equal length");
    if n < 2 {
        return parent_a.to_vec();
    }
    let (first, second) = rng.distinct_pair(n + 1);
    order_crossover_at(parent_a, parent_b, first.min(second), first.max(second))
}

/// OX with fixed cut points `start < end <= n`.
///
/// `parent_a[start..end]` is copied to the same positions of the child. The
/// other positions are filled from `parent_b`, read from `end` and wrapping
/// once around, skipping values already taken from `parent_a`, and written
/// from `end` onwards, wrapping at `n` back to `0`, until `start` is reached.
///
/// # Example
///
/// ```rust
/// use binpack_ga::chromosome::crossover::order_crossover_at;
///
/// let child = order_crossover_at(&[0, 1, 2, 3, 4, 5], &[5, 4, 3, 2, 1, 0], 1, 4);
/// assert_eq!(child, vec![4, 1, 2, 3, 0, 5]);
/// ```
pub fn order_crossover_at(parent_a: &[usize], parent_b: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = parent_a.len();
    debug_assert!(start < end && end <= n, "cut points out of order");

    let mut child = parent_a.to_vec();

    let mut used = parent_a[start..end].to_vec();
    used.sort_unstable();

    let mut remaining = n - (end - start);
    let mut write = end % n;
    for offset in 0..n {
        if remaining == 0 {
            break;
        }
        let value = parent_b[(end + offset) % n];
        if used.binary_search(&value).is_err() {
            child[write] = value;
            write = (write + 1) % n;
            remaining -= 1;
        }
    }
    child
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(values: &[usize]) -> bool {
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, &v)| i == v)
    }

    #[test]
    fn test_worked_example() {
        let child = order_crossover_at(&[0, 1, 2, 3, 4, 5], &[5, 4, 3, 2, 1, 0], 1, 4);
        assert_eq!(child, vec![4, 1, 2, 3, 0, 5]);
    }

    #[test]
    fn test_full_segment_copies_parent_a() {
        let a = [3, 1, 0, 2];
        let b = [0, 1, 2, 3];
        assert_eq!(order_crossover_at(&a, &b, 0, 4), a.to_vec());
    }

    #[test]
    fn test_segment_at_the_end_wraps_writes_to_front() {
        let a = [0, 1, 2, 3, 4];
        let b = [4, 3, 2, 1, 0];
        // Keeps 3, 4 from `a`; fills positions 0..3 from `b` starting at index 5 % 5 = 0.
        assert_eq!(order_crossover_at(&a, &b, 3, 5), vec![2, 1, 0, 3, 4]);
    }

    #[test]
    fn test_segment_at_the_start() {
        let a = [0, 1, 2, 3, 4];
        let b = [2, 4, 0, 3, 1];
        // Keeps 0, 1; reads b from index 2: 0 (skip), 3, 1 (skip), 2, 4.
        assert_eq!(order_crossover_at(&a, &b, 0, 2), vec![0, 1, 3, 2, 4]);
    }

    #[test]
    fn test_random_cuts_keep_bijection() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        let a: Vec<usize> = (0..30).collect();
        let b: Vec<usize> = (0..30).rev().collect();
        for _ in 0..500 {
            let child = order_crossover(&a, &b, &mut rng);
            assert!(is_permutation(&child));
        }
    }

    #[test]
    fn test_single_item() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        assert_eq!(order_crossover(&[0], &[0], &mut rng), vec![0]);
    }
}
