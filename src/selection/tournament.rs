use crate::error::{GeneticError, Result};
use crate::parallel::ParallelExecutor;
use crate::rng::{RandomNumberGenerator, WorkerRngs};
use crate::selection::selection_strategy::SelectionStrategy;

/// A selection strategy that picks parents through tournament selection.
///
/// Every tournament draws `tournament_size` distinct members of the
/// population and returns the index of the fittest one; ties go to the
/// member drawn last. One tournament is run per population slot.
///
/// Smaller tournaments keep more diversity, larger ones push harder towards
/// the current best.
///
/// # Examples
///
/// ```
/// use binpack_ga::parallel::ParallelExecutor;
/// use binpack_ga::rng::WorkerRngs;
/// use binpack_ga::selection::{SelectionStrategy, TournamentSelection};
///
/// let fitness = vec![0.5, 0.8, 0.3, 0.9, 0.1];
/// let executor = ParallelExecutor::new(2).unwrap();
/// let rngs = WorkerRngs::new(Some(7));
///
/// let winners = TournamentSelection::default()
///     .select(&fitness, &executor, &rngs)
///     .unwrap();
/// assert_eq!(winners.len(), fitness.len());
/// // The weakest member can never beat a distinct opponent.
/// assert!(!winners.contains(&4));
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Creates a tournament with `tournament_size` distinct participants.
    ///
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is less than 2.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 2 {
            return Err(GeneticError::Configuration(
                "Tournament size must be at least 2".to_string(),
            ));
        }
        Ok(Self { tournament_size })
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs a single tournament and returns the index of the winner.
    ///
    /// The population must hold at least `tournament_size` members.
    fn run_tournament(&self, fitness: &[f64], rng: &mut RandomNumberGenerator) -> usize {
        let (first, second) = rng.distinct_pair(fitness.len());
        let mut best_idx = if fitness[second] >= fitness[first] {
            second
        } else {
            first
        };

        if self.tournament_size > 2 {
            let mut participants = vec![first, second];
            while participants.len() < self.tournament_size {
                let candidate = rng.index(fitness.len());
                if participants.contains(&candidate) {
                    continue;
                }
                participants.push(candidate);
                if fitness[candidate] >= fitness[best_idx] {
                    best_idx = candidate;
                }
            }
        }
        best_idx
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

impl SelectionStrategy for TournamentSelection {
    fn select(
        &self,
        fitness: &[f64],
        executor: &ParallelExecutor,
        rngs: &WorkerRngs,
    ) -> Result<Vec<usize>> {
        if fitness.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }
        if fitness.len() < self.tournament_size {
            return Err(GeneticError::Configuration(format!(
                "Tournament size ({}) exceeds population size ({})",
                self.tournament_size,
                fitness.len()
            )));
        }

        let mut winners = vec![0usize; fitness.len()];
        executor.run(&mut winners, |slot| {
            *slot = rngs.with(|rng| self.run_tournament(fitness, rng));
            Ok(())
        })?;
        Ok(winners)
    }
}
