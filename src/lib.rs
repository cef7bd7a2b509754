pub mod case_injection;
pub mod chromosome;
pub mod error;
pub mod evolution;
pub mod local_search;
pub mod packing;
pub mod parallel;
pub mod population;
pub mod problem;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{GeneticError, OptionExt, Result, ResultExt};
pub use evolution::{EvolutionLauncher, EvolutionOptions, EvolutionResult};
pub use packing::{evaluate, pack, unpack, Bin, Solution};
pub use problem::Problem;
