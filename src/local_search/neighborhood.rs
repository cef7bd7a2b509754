//! Neighbor moves used by the local-search loop.

use std::fmt::Debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chromosome::swap_random;
use crate::error::{GeneticError, Result};
use crate::packing::Solution;
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;

/// Which representation a move touched.
///
/// The search loop uses it to rebuild the other one: a permutation-only
/// move is repacked, a solution-only move is unpacked and then repacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborChange {
    pub permutation_modified: bool,
    pub solution_modified: bool,
}

/// Produces a neighbor of a candidate in place.
///
/// `permutation` and `solution` are working copies owned by the search
/// loop; implementations may modify either or both.
pub trait Neighborhood: Debug + Send + Sync {
    fn neighbor(
        &self,
        permutation: &mut [usize],
        solution: &mut Solution,
        problem: &Problem,
        rng: &mut RandomNumberGenerator,
    ) -> Result<NeighborChange>;
}

/// The built-in neighbor moves.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeighborStrategy {
    /// Swap two random positions of the permutation.
    #[default]
    SwapRandom,
    /// Swap two random bins of the solution.
    ShuffleGroups,
    /// Reserved. Always fails with [`GeneticError::Unsupported`].
    Dominance,
}

impl Neighborhood for NeighborStrategy {
    fn neighbor(
        &self,
        permutation: &mut [usize],
        solution: &mut Solution,
        _problem: &Problem,
        rng: &mut RandomNumberGenerator,
    ) -> Result<NeighborChange> {
        match self {
            NeighborStrategy::SwapRandom => {
                swap_random(permutation, rng);
                Ok(NeighborChange {
                    permutation_modified: true,
                    solution_modified: false,
                })
            }
            NeighborStrategy::ShuffleGroups => {
                if solution.num_bins() < 2 {
                    return Ok(NeighborChange::default());
                }
                let (a, b) = rng.distinct_pair(solution.num_bins());
                solution.swap_bins(a, b);
                Ok(NeighborChange {
                    permutation_modified: false,
                    solution_modified: true,
                })
            }
            NeighborStrategy::Dominance => Err(GeneticError::Unsupported(
                "the dominance neighborhood is not implemented".to_string(),
            )),
        }
    }
}
