//! # Packing
//!
//! Converts between the two representations of a candidate: a permutation of
//! item indices (the genotype) and a [`Solution`] made of [`Bin`]s (the
//! phenotype).
//!
//! - [`pack`] runs greedy first-fit over the items in permutation order.
//! - [`unpack`] flattens the bins back into a permutation. Packing the result
//!   of `unpack` reproduces the same bins, so the pair is a fixed point.
//! - [`evaluate`] scores a solution with Falkenauer's metric,
//!   `Σ sum² / (capacity² · bins)`, which is `1.0` only when every bin is full.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::packing::{evaluate, pack};
//!
//! let weights = [5.0, 5.0, 5.0, 5.0];
//! let solution = pack(&weights, &[0, 1, 2, 3], 10.0);
//! assert_eq!(solution.num_bins(), 2);
//! assert_eq!(evaluate(&solution, 10.0), 1.0);
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A bin: the indices of the items it holds and their summed weight.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bin {
    items: Vec<usize>,
    sum: f64,
}

impl Bin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` and its weight. Capacity is the caller's concern.
    pub fn push(&mut self, item: usize, weights: &[f64]) {
        self.items.push(item);
        self.sum += weights[item];
    }

    pub fn items(&self) -> &[usize] {
        &self.items
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether an item of `weight` still fits under `capacity`.
    pub fn fits(&self, weight: f64, capacity: f64) -> bool {
        self.sum + weight <= capacity
    }
}

/// An ordered sequence of bins. The order is the packing order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Solution {
    bins: Vec<Bin>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bins(bins: Vec<Bin>) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Total number of items over all bins.
    pub fn num_items(&self) -> usize {
        self.bins.iter().map(Bin::len).sum()
    }

    /// Exchanges two whole bins.
    pub fn swap_bins(&mut self, a: usize, b: usize) {
        self.bins.swap(a, b);
    }

    pub fn push(&mut self, bin: Bin) {
        self.bins.push(bin);
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, bin) in self.bins.iter().enumerate() {
            write!(f, "bin {}: {:.6} |", index, bin.sum)?;
            for item in &bin.items {
                write!(f, " {}", item)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// First-fit: each item, in `permutation` order, goes into the earliest bin
/// with room for it, or into a new bin when none has.
pub fn pack(weights: &[f64], permutation: &[usize], capacity: f64) -> Solution {
    let mut solution = Solution::new();
    for &item in permutation {
        let weight = weights[item];
        match solution.bins.iter_mut().find(|bin| bin.fits(weight, capacity)) {
            Some(bin) => bin.push(item, weights),
            None => {
                let mut bin = Bin::new();
                bin.push(item, weights);
                solution.bins.push(bin);
            }
        }
    }
    solution
}

/// Bins in order, items within each bin in insertion order.
pub fn unpack(solution: &Solution) -> Vec<usize> {
    let mut permutation = Vec::with_capacity(solution.num_items());
    for bin in &solution.bins {
        permutation.extend_from_slice(&bin.items);
    }
    permutation
}

/// Falkenauer fitness in `(0, 1]`.
///
/// The solution must hold at least one bin.
pub fn evaluate(solution: &Solution, capacity: f64) -> f64 {
    debug_assert!(!solution.is_empty(), "cannot score a solution without bins");
    let squares: f64 = solution.bins.iter().map(|bin| bin.sum * bin.sum).sum();
    squares / (capacity * capacity * solution.num_bins() as f64)
}
