//! # Chromosome
//!
//! A [`Chromosome`] pairs a permutation of item indices (the genotype) with
//! the first-fit [`Solution`] it packs into (the phenotype) and a cached
//! fitness. The cache starts out [`Fitness::Unevaluated`] and only
//! [`Chromosome::evaluate`] moves it to [`Fitness::Evaluated`]; any change to
//! the permutation drops it back and discards the phenotype.
//!
//! Under Baldwinian learning a chromosome also carries a *learned* solution,
//! written by local search without touching the genotype or the primary
//! phenotype. The fitness then reflects the learned solution.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::chromosome::Chromosome;
//! use binpack_ga::problem::Problem;
//!
//! let problem = Problem::new(10.0, vec![5.0, 5.0, 5.0, 5.0]).unwrap();
//! let mut chromosome = Chromosome::new(vec![0, 1, 2, 3]);
//! assert!(chromosome.fitness().is_none());
//!
//! chromosome.evaluate(&problem);
//! assert_eq!(chromosome.fitness(), Some(1.0));
//! assert_eq!(chromosome.phenotype().unwrap().num_bins(), 2);
//! ```

pub mod crossover;

use crate::packing::{evaluate, pack, Solution};
use crate::problem::Problem;
use crate::rng::RandomNumberGenerator;

/// Lazily computed, invalidatable fitness.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Fitness {
    #[default]
    Unevaluated,
    Evaluated(f64),
}

impl Fitness {
    pub fn value(self) -> Option<f64> {
        match self {
            Fitness::Unevaluated => None,
            Fitness::Evaluated(value) => Some(value),
        }
    }
}

/// A permutation genotype with its cached phenotype and fitness.
#[derive(Debug, Clone, PartialEq)]
pub struct Chromosome {
    permutation: Vec<usize>,
    phenotype: Option<Solution>,
    learned: Option<Solution>,
    fitness: Fitness,
}

impl Chromosome {
    /// Wraps a permutation; nothing is evaluated yet.
    pub fn new(permutation: Vec<usize>) -> Self {
        Self {
            permutation,
            phenotype: None,
            learned: None,
            fitness: Fitness::Unevaluated,
        }
    }

    /// A chromosome over the identity permutation `0..len`.
    pub fn identity(len: usize) -> Self {
        Self::new((0..len).collect())
    }

    /// Order crossover of two parents. The child is unevaluated.
    pub fn crossover(parent_a: &Chromosome, parent_b: &Chromosome, rng: &mut RandomNumberGenerator) -> Self {
        Self::new(crossover::order_crossover(
            &parent_a.permutation,
            &parent_b.permutation,
            rng,
        ))
    }

    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// The first-fit packing of the genotype, once evaluated.
    pub fn phenotype(&self) -> Option<&Solution> {
        self.phenotype.as_ref()
    }

    /// The Baldwinian learned solution, if local search produced one.
    pub fn learned(&self) -> Option<&Solution> {
        self.learned.as_ref()
    }

    /// The solution the fitness refers to: learned if any, else the phenotype.
    pub fn expressed(&self) -> Option<&Solution> {
        self.learned.as_ref().or(self.phenotype.as_ref())
    }

    pub fn fitness_state(&self) -> Fitness {
        self.fitness
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness.value()
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self.fitness, Fitness::Evaluated(_))
    }

    /// Packs and scores the genotype unless the fitness is already cached,
    /// and returns the fitness.
    pub fn evaluate(&mut self, problem: &Problem) -> f64 {
        if let Fitness::Evaluated(value) = self.fitness {
            return value;
        }
        let solution = pack(problem.weights(), &self.permutation, problem.capacity());
        let value = evaluate(&solution, problem.capacity());
        self.fitness = Fitness::Evaluated(value);
        self.phenotype = Some(solution);
        value
    }

    /// Swaps two distinct random positions of the genotype.
    ///
    /// Always invalidates the cached fitness and both phenotypes. Genotypes
    /// shorter than two items are left unchanged.
    pub fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
        self.invalidate();
        swap_random(&mut self.permutation, rng);
    }

    /// Replaces the genotype, invalidating everything derived from it.
    pub fn set_permutation(&mut self, permutation: Vec<usize>) {
        self.invalidate();
        self.permutation = permutation;
    }

    /// Lamarckian write-back: genotype, phenotype and fitness all move to the
    /// improved candidate.
    pub(crate) fn accept_inherited(&mut self, permutation: &[usize], solution: Solution, fitness: f64) {
        self.permutation.copy_from_slice(permutation);
        self.phenotype = Some(solution);
        self.fitness = Fitness::Evaluated(fitness);
    }

    /// Baldwinian write-back: only the learned solution and fitness change.
    pub(crate) fn accept_learned(&mut self, solution: Solution, fitness: f64) {
        self.learned = Some(solution);
        self.fitness = Fitness::Evaluated(fitness);
    }

    fn invalidate(&mut self) {
        self.fitness = Fitness::Unevaluated;
        self.phenotype = None;
        self.learned = None;
    }
}

/// Swaps two distinct uniformly chosen positions; no-op below two items.
pub(crate) fn swap_random(permutation: &mut [usize], rng: &mut RandomNumberGenerator) {
    if permutation.len() < 2 {
        return;
    }
    let (i, j) = rng.distinct_pair(permutation.len());
    permutation.swap(i, j);
}
