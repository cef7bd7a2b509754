//! # Local Search
//!
//! Hill climbing over a [`Neighborhood`]. Each iteration copies the
//! chromosome's genotype and phenotype, lets the neighborhood modify the
//! copies, rebuilds whichever representation was not touched and scores the
//! result. Only strictly better neighbors are accepted.
//!
//! Where an accepted neighbor is written depends on the [`Adaptation`] mode:
//!
//! - [`Adaptation::Lamarckian`] writes the neighbor's permutation and
//!   solution back into the chromosome, so the improvement is inherited.
//! - [`Adaptation::Baldwinian`] keeps the genotype and the primary phenotype
//!   and records the neighbor as the chromosome's learned solution. Only the
//!   fitness, and therefore selection, sees the improvement.
//!
//! A greedy search stops at the first improvement; a steepest search keeps
//! climbing for its whole iteration budget.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::chromosome::Chromosome;
//! use binpack_ga::local_search::{Adaptation, LocalSearch, NeighborStrategy};
//! use binpack_ga::problem::Problem;
//! use binpack_ga::rng::RandomNumberGenerator;
//!
//! let problem = Problem::new(10.0, vec![6.0, 4.0, 6.0, 4.0]).unwrap();
//! let mut chromosome = Chromosome::new(vec![0, 2, 1, 3]);
//! let mut rng = RandomNumberGenerator::from_seed(1);
//!
//! let search = LocalSearch::steepest(50).unwrap();
//! let evaluated = search
//!     .search(&mut chromosome, Adaptation::Lamarckian, &problem, &NeighborStrategy::SwapRandom, &mut rng)
//!     .unwrap();
//! assert_eq!(evaluated, 50);
//! assert!(chromosome.fitness().unwrap() > 0.0);
//! ```

pub mod neighborhood;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::chromosome::Chromosome;
use crate::error::{GeneticError, Result};
use crate::packing::{evaluate, pack, unpack};
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;

pub use neighborhood::{NeighborChange, NeighborStrategy, Neighborhood};

/// Where improvements found by local search end up.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Adaptation {
    /// Improvements are written back into the genotype.
    #[default]
    Lamarckian,
    /// Improvements only affect fitness; the genotype is kept.
    Baldwinian,
}

/// A bounded hill climber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSearch {
    greedy: bool,
    max_iterations: usize,
}

impl LocalSearch {
    /// A search that stops at the first improving neighbor.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_iterations` is zero.
    pub fn greedy(max_iterations: usize) -> Result<Self> {
        Self::with_mode(true, max_iterations)
    }

    /// A search that always runs `max_iterations` neighbors, accepting every
    /// strict improvement along the way.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `max_iterations` is zero.
    pub fn steepest(max_iterations: usize) -> Result<Self> {
        Self::with_mode(false, max_iterations)
    }

    fn with_mode(greedy: bool, max_iterations: usize) -> Result<Self> {
        if max_iterations == 0 {
            return Err(GeneticError::Configuration(
                "Local search needs at least one iteration".to_string(),
            ));
        }
        Ok(Self {
            greedy,
            max_iterations,
        })
    }

    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Climbs from `chromosome` and returns how many neighbors were evaluated.
    ///
    /// The chromosome is evaluated first if its fitness is not cached. The
    /// count includes the iteration that found the accepted neighbor when a
    /// greedy search stops early.
    ///
    /// # Errors
    ///
    /// Propagates any error from the neighborhood, e.g.
    /// [`GeneticError::Unsupported`] for [`NeighborStrategy::Dominance`].
    pub fn search<N>(
        &self,
        chromosome: &mut Chromosome,
        adaptation: Adaptation,
        problem: &Problem,
        neighborhood: &N,
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize>
    where
        N: Neighborhood + ?Sized,
    {
        let mut current = chromosome.evaluate(problem);
        let mut performed = 0;

        while performed < self.max_iterations {
            performed += 1;

            let mut permutation = chromosome.permutation().to_vec();
            let mut solution = chromosome.phenotype().cloned().unwrap_or_default();
            let change = neighborhood.neighbor(&mut permutation, &mut solution, problem, rng)?;

            if change.solution_modified && !change.permutation_modified {
                permutation = unpack(&solution);
            }
            let candidate = pack(problem.weights(), &permutation, problem.capacity());
            let fitness = evaluate(&candidate, problem.capacity());

            if fitness > current {
                trace!(from = current, to = fitness, iteration = performed, "accepted neighbor");
                current = fitness;
                match adaptation {
                    Adaptation::Lamarckian => {
                        chromosome.accept_inherited(&permutation, candidate, fitness)
                    }
                    Adaptation::Baldwinian => chromosome.accept_learned(candidate, fitness),
                }
                if self.greedy {
                    break;
                }
            }
        }
        Ok(performed)
    }
}
