//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds every tunable of a run: population
//! size, mutation rate, stopping policy, thread count, and the choice of
//! initialization, local search, neighborhood and adaptation model.
//!
//! Options are normally created through [`EvolutionOptions::builder`], whose
//! `build()` rejects invalid combinations up front. Most notably, Baldwinian
//! adaptation without local search is a configuration error: without a
//! learning step there is nothing for the Baldwinian model to learn.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use binpack_ga::evolution::options::{Adaptation, EvolutionOptions, NeighborStrategy};
//!
//! let options = EvolutionOptions::builder()
//!     .population_size(50)
//!     .max_generations(Some(200))
//!     .max_time(Some(Duration::from_secs(3)))
//!     .neighbor(NeighborStrategy::ShuffleGroups)
//!     .adaptation(Adaptation::Baldwinian)
//!     .build()
//!     .unwrap();
//! assert_eq!(options.get_population_size(), 50);
//!
//! let invalid = EvolutionOptions::builder()
//!     .adaptation(Adaptation::Baldwinian)
//!     .use_local_search(false)
//!     .build();
//! assert!(invalid.is_err());
//! ```
//!
//! ## Defaults
//!
//! | option | default |
//! |---|---|
//! | `population_size` | 100 |
//! | `mutation_rate` | 0.1 |
//! | `max_generations` | `Some(1000)` |
//! | `max_time` | `None` (unlimited) |
//! | `num_threads` | 4 |
//! | `init_strategy` | successive mutation |
//! | `use_local_search` | `true` |
//! | `neighbor` | swap-random |
//! | `adaptation` | Lamarckian |
//! | `use_case_injection` | `false` |
//! | `search_iterations` | 100 |
//! | `max_init_mutations` | 20 |
//! | `seed` | `None` |

use std::time::Duration;

use crate::error::{GeneticError, Result};

pub use crate::local_search::{Adaptation, NeighborStrategy};
pub use crate::population::InitStrategy;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    population_size: usize,
    mutation_rate: f64,
    max_generations: Option<usize>,
    max_time: Option<Duration>,
    num_threads: usize,
    init_strategy: InitStrategy,
    use_local_search: bool,
    neighbor: NeighborStrategy,
    adaptation: Adaptation,
    use_case_injection: bool,
    /// Iteration cap of each local search run during the generational loop.
    search_iterations: usize,
    /// Upper bound of the 1..=n random swaps applied when seeding.
    max_init_mutations: usize,
    seed: Option<u64>,
}

impl EvolutionOptions {
    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }

    /// Checks the combination of tunables.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any of these hold:
    /// - Baldwinian adaptation without local search
    /// - population size below 2
    /// - zero threads
    /// - mutation rate outside `[0, 1]`
    /// - zero search iterations or zero initial mutations
    pub fn validate(&self) -> Result<()> {
        if self.adaptation == Adaptation::Baldwinian && !self.use_local_search {
            return Err(GeneticError::Configuration(
                "Baldwinian adaptation requires local search".to_string(),
            ));
        }
        if self.population_size < 2 {
            return Err(GeneticError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.num_threads < 1 {
            return Err(GeneticError::Configuration(
                "Thread count must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GeneticError::Configuration(format!(
                "Mutation rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.search_iterations < 1 {
            return Err(GeneticError::Configuration(
                "Local search needs at least one iteration".to_string(),
            ));
        }
        if self.max_init_mutations < 1 {
            return Err(GeneticError::Configuration(
                "Initial mutation count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// `None` means no generation cap.
    pub fn get_max_generations(&self) -> Option<usize> {
        self.max_generations
    }

    /// `None` means no wall-clock budget.
    pub fn get_max_time(&self) -> Option<Duration> {
        self.max_time
    }

    pub fn get_num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn get_init_strategy(&self) -> InitStrategy {
        self.init_strategy
    }

    pub fn get_use_local_search(&self) -> bool {
        self.use_local_search
    }

    pub fn get_neighbor(&self) -> NeighborStrategy {
        self.neighbor
    }

    pub fn get_adaptation(&self) -> Adaptation {
        self.adaptation
    }

    pub fn get_use_case_injection(&self) -> bool {
        self.use_case_injection
    }

    pub fn get_search_iterations(&self) -> usize {
        self.search_iterations
    }

    pub fn get_max_init_mutations(&self) -> usize {
        self.max_init_mutations
    }

    pub fn get_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Sets the generation cap. Does not revalidate.
    pub fn set_max_generations(&mut self, max_generations: Option<usize>) {
        self.max_generations = max_generations;
    }

    /// Sets the wall-clock budget. Does not revalidate.
    pub fn set_max_time(&mut self, max_time: Option<Duration>) {
        self.max_time = max_time;
    }

    /// Sets the RNG seed.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: 0.1,
            max_generations: Some(1000),
            max_time: None,
            num_threads: 4,
            init_strategy: InitStrategy::SuccessiveMutation,
            use_local_search: true,
            neighbor: NeighborStrategy::SwapRandom,
            adaptation: Adaptation::Lamarckian,
            use_case_injection: false,
            search_iterations: 100,
            max_init_mutations: 20,
            seed: None,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Unset fields fall back to the defaults of [`EvolutionOptions::default`].
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    mutation_rate: Option<f64>,
    max_generations: Option<Option<usize>>,
    max_time: Option<Option<Duration>>,
    num_threads: Option<usize>,
    init_strategy: Option<InitStrategy>,
    use_local_search: Option<bool>,
    neighbor: Option<NeighborStrategy>,
    adaptation: Option<Adaptation>,
    use_case_injection: Option<bool>,
    search_iterations: Option<usize>,
    max_init_mutations: Option<usize>,
    seed: Option<u64>,
}

impl EvolutionOptionsBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    /// `None` removes the generation cap.
    pub fn max_generations(mut self, value: Option<usize>) -> Self {
        self.max_generations = Some(value);
        self
    }

    /// `None` removes the wall-clock budget.
    pub fn max_time(mut self, value: Option<Duration>) -> Self {
        self.max_time = Some(value);
        self
    }

    pub fn num_threads(mut self, value: usize) -> Self {
        self.num_threads = Some(value);
        self
    }

    pub fn init_strategy(mut self, value: InitStrategy) -> Self {
        self.init_strategy = Some(value);
        self
    }

    pub fn use_local_search(mut self, value: bool) -> Self {
        self.use_local_search = Some(value);
        self
    }

    pub fn neighbor(mut self, value: NeighborStrategy) -> Self {
        self.neighbor = Some(value);
        self
    }

    pub fn adaptation(mut self, value: Adaptation) -> Self {
        self.adaptation = Some(value);
        self
    }

    pub fn use_case_injection(mut self, value: bool) -> Self {
        self.use_case_injection = Some(value);
        self
    }

    pub fn search_iterations(mut self, value: usize) -> Self {
        self.search_iterations = Some(value);
        self
    }

    pub fn max_init_mutations(mut self, value: usize) -> Self {
        self.max_init_mutations = Some(value);
        self
    }

    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Builds and validates the options.
    ///
    /// # Errors
    ///
    /// See [`EvolutionOptions::validate`].
    pub fn build(self) -> Result<EvolutionOptions> {
        let default = EvolutionOptions::default();
        let options = EvolutionOptions {
            population_size: self.population_size.unwrap_or(default.population_size),
            mutation_rate: self.mutation_rate.unwrap_or(default.mutation_rate),
            max_generations: self.max_generations.unwrap_or(default.max_generations),
            max_time: self.max_time.unwrap_or(default.max_time),
            num_threads: self.num_threads.unwrap_or(default.num_threads),
            init_strategy: self.init_strategy.unwrap_or(default.init_strategy),
            use_local_search: self.use_local_search.unwrap_or(default.use_local_search),
            neighbor: self.neighbor.unwrap_or(default.neighbor),
            adaptation: self.adaptation.unwrap_or(default.adaptation),
            use_case_injection: self.use_case_injection.unwrap_or(default.use_case_injection),
            search_iterations: self.search_iterations.unwrap_or(default.search_iterations),
            max_init_mutations: self.max_init_mutations.unwrap_or(default.max_init_mutations),
            seed: self.seed.or(default.seed),
        };
        options.validate()?;
        Ok(options)
    }
}
