//! # Population
//!
//! A fixed-size, ordered collection of [`Chromosome`]s over one [`Problem`],
//! together with the executor, per-worker generators and adaptation mode the
//! generational operators run with.
//!
//! Slot 0 is the elite slot: after [`Population::reproduce`] it holds a fresh
//! copy of the previous generation's best solution, and
//! [`Population::mutate_all`] never touches it. This is what keeps the best
//! fitness non-decreasing from one generation to the next.
//!
//! Every operator that works on chromosomes independently runs through the
//! [`ParallelExecutor`]. Aggregates (average fitness, best chromosome,
//! search counts) are folded per worker and merged after the workers join.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::local_search::{Adaptation, NeighborStrategy};
//! use binpack_ga::parallel::ParallelExecutor;
//! use binpack_ga::population::{InitStrategy, Population};
//! use binpack_ga::problem::Problem;
//! use binpack_ga::selection::TournamentSelection;
//!
//! let problem = Problem::new(10.0, vec![3.0, 7.0, 5.0, 5.0, 2.0, 8.0]).unwrap();
//! let executor = ParallelExecutor::new(2).unwrap();
//! let mut population = Population::new(&problem, 20, Adaptation::Lamarckian, executor, Some(3)).unwrap();
//!
//! population
//!     .initialize(InitStrategy::SuccessiveMutation, &NeighborStrategy::SwapRandom, Vec::new(), 20)
//!     .unwrap();
//! population.evaluate_all().unwrap();
//!
//! let winners = population.select(&TournamentSelection::default()).unwrap();
//! let next = population.reproduce(&winners).unwrap();
//! population.replace(next).unwrap();
//! population.mutate_all(0.1).unwrap();
//! population.evaluate_all().unwrap();
//!
//! let (fitness, best) = population.best().unwrap();
//! assert!(fitness > 0.0 && fitness <= 1.0);
//! assert_eq!(best.num_items(), 6);
//! ```

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chromosome::Chromosome;
use crate::error::{GeneticError, OptionExt, Result};
use crate::local_search::{Adaptation, LocalSearch, Neighborhood};
use crate::packing::{unpack, Solution};
use crate::parallel::ParallelExecutor;
use crate::problem::Problem;
use crate::rng::{RandomNumberGenerator, WorkerRngs};
use crate::selection::SelectionStrategy;

/// Iteration cap of the greedy climb used by [`InitStrategy::HillClimb`].
pub const INIT_SEARCH_ITERATIONS: usize = 100;

/// How the slots after the first seeded chromosome are filled.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStrategy {
    /// Each slot is the previous slot's permutation with 1..=max random swaps.
    #[default]
    SuccessiveMutation,
    /// Each slot is the previous slot improved by a greedy climb, or randomly
    /// perturbed if the climb found nothing.
    HillClimb,
}

/// The chromosomes of one generation and the machinery to evolve them.
#[derive(Debug)]
pub struct Population<'p> {
    problem: &'p Problem,
    chromosomes: Vec<Chromosome>,
    adaptation: Adaptation,
    executor: ParallelExecutor,
    rngs: WorkerRngs,
}

impl<'p> Population<'p> {
    /// Creates `size` identity chromosomes over `problem`.
    ///
    /// `seed` fixes the per-worker generators; `None` seeds from entropy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `size` is less than 2.
    pub fn new(
        problem: &'p Problem,
        size: usize,
        adaptation: Adaptation,
        executor: ParallelExecutor,
        seed: Option<u64>,
    ) -> Result<Self> {
        if size < 2 {
            return Err(GeneticError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        Ok(Self {
            problem,
            chromosomes: vec![Chromosome::identity(problem.len()); size],
            adaptation,
            executor,
            rngs: WorkerRngs::new(seed),
        })
    }

    pub fn problem(&self) -> &Problem {
        self.problem
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn adaptation(&self) -> Adaptation {
        self.adaptation
    }

    /// Seeds every slot and returns the number of local-search neighbors
    /// evaluated while doing so (zero unless `strategy` is hill climbing).
    ///
    /// Warm-start permutations fill the first slots, one each, until either
    /// runs out. Without any, slot 0 is the identity permutation perturbed
    /// by 1..=`max_init_mutations` random swaps. The rest follow `strategy`.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `max_init_mutations` is zero or a warm-start
    ///   entry is not a permutation of the problem's items.
    /// - Any error of the neighborhood during hill climbing.
    pub fn initialize<N>(
        &mut self,
        strategy: InitStrategy,
        neighborhood: &N,
        warm_start: Vec<Vec<usize>>,
        max_init_mutations: usize,
    ) -> Result<usize>
    where
        N: Neighborhood + ?Sized,
    {
        if max_init_mutations == 0 {
            return Err(GeneticError::Configuration(
                "Initial mutation count must be at least 1".to_string(),
            ));
        }

        let size = self.chromosomes.len();
        let items = self.problem.len();
        for chromosome in self.chromosomes.iter_mut() {
            chromosome.set_permutation((0..items).collect());
        }

        let mut seeded = 0;
        for permutation in warm_start.into_iter().take(size) {
            if !is_permutation(&permutation, items) {
                return Err(GeneticError::Configuration(format!(
                    "Warm-start entry {} is not a permutation of {} items",
                    seeded, items
                )));
            }
            self.chromosomes[seeded].set_permutation(permutation);
            seeded += 1;
        }
        debug!(seeded, size, ?strategy, "initializing population");

        let problem = self.problem;
        let chromosomes = &mut self.chromosomes;
        self.rngs.with(|rng| -> Result<usize> {
            if seeded == 0 {
                perturb(&mut chromosomes[0], max_init_mutations, rng);
                seeded = 1;
            }

            match strategy {
                InitStrategy::SuccessiveMutation => {
                    for i in seeded..size {
                        let previous = chromosomes[i - 1].permutation().to_vec();
                        chromosomes[i].set_permutation(previous);
                        perturb(&mut chromosomes[i], max_init_mutations, rng);
                    }
                    Ok(0)
                }
                InitStrategy::HillClimb => {
                    let climb = LocalSearch::greedy(INIT_SEARCH_ITERATIONS)?;
                    let mut searches = 0;
                    for i in seeded..size {
                        let previous = chromosomes[i - 1].permutation().to_vec();
                        let chromosome = &mut chromosomes[i];
                        chromosome.set_permutation(previous.clone());
                        chromosome.evaluate(problem);
                        searches += climb.search(
                            chromosome,
                            Adaptation::Lamarckian,
                            problem,
                            neighborhood,
                            rng,
                        )?;
                        if chromosome.permutation() == previous.as_slice() {
                            perturb(chromosome, max_init_mutations, rng);
                        }
                    }
                    Ok(searches)
                }
            }
        })
    }

    /// Evaluates every chromosome whose fitness is not cached.
    pub fn evaluate_all(&mut self) -> Result<()> {
        let problem = self.problem;
        self.executor.run(&mut self.chromosomes, |chromosome| {
            chromosome.evaluate(problem);
            Ok(())
        })
    }

    /// Picks one parent candidate per slot with `strategy`.
    ///
    /// # Errors
    ///
    /// Fails if any chromosome is unevaluated, or with the strategy's error.
    pub fn select<S>(&self, strategy: &S) -> Result<Vec<usize>>
    where
        S: SelectionStrategy + ?Sized,
    {
        let fitness = self.fitness_values()?;
        strategy.select(&fitness, &self.executor, &self.rngs)
    }

    /// Builds the next generation from the tournament `winners`.
    ///
    /// Slot 0 holds the current best solution, re-encoded with `unpack` and
    /// left unevaluated. Every other slot is the order crossover of the
    /// chromosomes at two distinct positions of `winners`.
    ///
    /// # Errors
    ///
    /// Fails if `winners` has fewer than two entries or points outside the
    /// population, or if the population is not evaluated.
    pub fn reproduce(&self, winners: &[usize]) -> Result<Vec<Chromosome>> {
        if winners.len() < 2 {
            return Err(GeneticError::Configuration(
                "Reproduction needs at least two tournament winners".to_string(),
            ));
        }
        if let Some(&bad) = winners.iter().find(|&&w| w >= self.chromosomes.len()) {
            return Err(GeneticError::Configuration(format!(
                "Tournament winner {} is outside the population",
                bad
            )));
        }

        let (_, best_index) = self.best_index()?;
        let elite = self.chromosomes[best_index]
            .expressed()
            .map(|solution| Chromosome::new(unpack(solution)))
            .ok_or_else_genetic(|| GeneticError::Other("best chromosome has no solution".to_string()))?;

        let parents = &self.chromosomes;
        let rngs = &self.rngs;
        let mut children = vec![Chromosome::new(Vec::new()); self.chromosomes.len() - 1];
        self.executor.run(&mut children, |child| {
            *child = rngs.with(|rng| {
                let (a, b) = rng.distinct_pair(winners.len());
                Chromosome::crossover(&parents[winners[a]], &parents[winners[b]], rng)
            });
            Ok(())
        })?;

        let mut next = Vec::with_capacity(self.chromosomes.len());
        next.push(elite);
        next.extend(children);
        Ok(next)
    }

    /// Discards the current generation in favour of `next`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the sizes differ.
    pub fn replace(&mut self, next: Vec<Chromosome>) -> Result<()> {
        if next.len() != self.chromosomes.len() {
            return Err(GeneticError::Configuration(format!(
                "Replacement generation has {} chromosomes, expected {}",
                next.len(),
                self.chromosomes.len()
            )));
        }
        self.chromosomes = next;
        Ok(())
    }

    /// Mutates every chromosome but the elite with probability `rate`.
    pub fn mutate_all(&mut self, rate: f64) -> Result<()> {
        let rngs = &self.rngs;
        self.executor.run(&mut self.chromosomes[1..], |chromosome| {
            rngs.with(|rng| {
                if rng.chance(rate) {
                    chromosome.mutate(rng);
                }
            });
            Ok(())
        })
    }

    /// Runs `search` from every chromosome under the population's adaptation
    /// mode and returns the total number of neighbors evaluated.
    pub fn local_search_all<N>(&mut self, search: &LocalSearch, neighborhood: &N) -> Result<usize>
    where
        N: Neighborhood + ?Sized,
    {
        let problem = self.problem;
        let adaptation = self.adaptation;
        let rngs = &self.rngs;
        let partials = self.executor.fold_mut(
            &mut self.chromosomes,
            || 0usize,
            |count, chromosome| {
                *count += rngs.with(|rng| {
                    search.search(chromosome, adaptation, problem, neighborhood, rng)
                })?;
                Ok(())
            },
        )?;
        Ok(partials.into_iter().sum())
    }

    /// Mean fitness over the population.
    pub fn average_fitness(&self) -> Result<f64> {
        let partials = self.executor.fold(
            &self.chromosomes,
            || 0.0f64,
            |sum, chromosome| {
                *sum += cached_fitness(chromosome)?;
                Ok(())
            },
        )?;
        Ok(partials.into_iter().sum::<f64>() / self.chromosomes.len() as f64)
    }

    /// The highest fitness and a copy of the solution it belongs to.
    pub fn best(&self) -> Result<(f64, Solution)> {
        let (fitness, index) = self.best_index()?;
        let solution = self.chromosomes[index]
            .expressed()
            .cloned()
            .ok_or_else_genetic(|| GeneticError::Other("best chromosome has no solution".to_string()))?;
        Ok((fitness, solution))
    }

    /// Fitness and slot of the best chromosome; ties go to the lower slot.
    fn best_index(&self) -> Result<(f64, usize)> {
        let indexed: Vec<(usize, &Chromosome)> = self.chromosomes.iter().enumerate().collect();
        let partials = self.executor.fold(
            &indexed,
            || None::<(f64, usize)>,
            |best, &(index, chromosome)| {
                let fitness = cached_fitness(chromosome)?;
                *best = better(*best, (fitness, index));
                Ok(())
            },
        )?;
        partials
            .into_iter()
            .flatten()
            .fold(None, |best, candidate| better(best, candidate))
            .ok_or_else_genetic(|| GeneticError::EmptyPopulation)
    }

    fn fitness_values(&self) -> Result<Vec<f64>> {
        self.chromosomes.iter().map(cached_fitness).collect()
    }
}

fn cached_fitness(chromosome: &Chromosome) -> Result<f64> {
    chromosome.fitness().ok_or_else_genetic(|| {
        GeneticError::Other("population must be evaluated before aggregation".to_string())
    })
}

fn better(current: Option<(f64, usize)>, candidate: (f64, usize)) -> Option<(f64, usize)> {
    match current {
        None => Some(candidate),
        Some(best) => match candidate.0.partial_cmp(&best.0) {
            Some(Ordering::Greater) => Some(candidate),
            Some(Ordering::Equal) if candidate.1 < best.1 => Some(candidate),
            _ => Some(best),
        },
    }
}

/// Applies 1..=`max` random swaps.
fn perturb(chromosome: &mut Chromosome, max: usize, rng: &mut RandomNumberGenerator) {
    let count = rng.range_inclusive(1, max);
    for _ in 0..count {
        chromosome.mutate(rng);
    }
}

fn is_permutation(values: &[usize], len: usize) -> bool {
    if values.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    values.iter().all(|&v| v < len && !std::mem::replace(&mut seen[v], true))
}
