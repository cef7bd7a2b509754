use std::fmt::Debug;

use crate::error::Result;
use crate::parallel::ParallelExecutor;
use crate::rng::WorkerRngs;

/// Trait for parent selection strategies.
///
/// A strategy looks only at the fitness of each population slot and returns,
/// for every slot, the index of the chromosome chosen as a parent candidate.
/// The returned vector has the same length as `fitness`.
pub trait SelectionStrategy: Debug + Send + Sync {
    /// Selects one parent index per population slot.
    ///
    /// Work is spread over `executor`; each worker draws from its own
    /// generator in `rngs`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `fitness` is empty
    /// - The population is too small for the strategy
    /// - The parallel phase fails
    fn select(
        &self,
        fitness: &[f64],
        executor: &ParallelExecutor,
        rngs: &WorkerRngs,
    ) -> Result<Vec<usize>>;
}
