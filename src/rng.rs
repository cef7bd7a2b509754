//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct wraps `rand`'s `StdRng` with the handful
//! of draws the genetic operators need: a uniform index, a pair of distinct
//! indices, and a Bernoulli trial.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let (a, b) = rng.distinct_pair(10);
//! assert_ne!(a, b);
//! assert!(a < 10 && b < 10);
//! ```
//!
//! ## Per-worker generators
//!
//! Parallel phases draw from [`WorkerRngs`], which lazily hands every worker
//! thread its own generator so no RNG state is ever shared between threads:
//!
//! ```rust
//! use binpack_ga::rng::WorkerRngs;
//!
//! let rngs = WorkerRngs::new(Some(42));
//! let index = rngs.with(|rng| rng.index(5));
//! assert!(index < 5);
//! ```

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::{rngs::StdRng, Rng, SeedableRng};
use thread_local::ThreadLocal;

/// A wrapper around the `rand` crate's `StdRng`.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is useful for reproducible tests and benchmarks.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Returns a uniform index in `0..upper`.
    ///
    /// `upper` must be non-zero.
    pub fn index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }

    /// Returns a uniform value in `low..=high`.
    pub fn range_inclusive(&mut self, low: usize, high: usize) -> usize {
        self.rng.gen_range(low..=high)
    }

    /// Returns two different uniform indices in `0..upper`, in draw order.
    ///
    /// `upper` must be at least 2.
    pub fn distinct_pair(&mut self, upper: usize) -> (usize, usize) {
        let first = self.index(upper);
        // Draw from the remaining `upper - 1` values and skip over `first`.
        let mut second = self.index(upper - 1);
        if second >= first {
            second += 1;
        }
        (first, second)
    }

    /// Returns `true` with probability `probability`, clamped to `[0, 1]`.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// Spreads consecutive worker streams across the seed space.
const STREAM_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// One `RandomNumberGenerator` per worker thread.
///
/// With a base seed, each thread that first touches the pool receives the
/// next stream derived from that seed. Which thread gets which stream depends
/// on scheduling, so runs are reproducible only with a single worker.
#[derive(Debug)]
pub struct WorkerRngs {
    seed: Option<u64>,
    next_stream: AtomicU64,
    local: ThreadLocal<RefCell<RandomNumberGenerator>>,
}

impl WorkerRngs {
    /// Creates an empty pool; generators are created on first use per thread.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            next_stream: AtomicU64::new(0),
            local: ThreadLocal::new(),
        }
    }

    /// Runs `f` with the calling thread's generator.
    ///
    /// Must not be called re-entrantly from inside `f`.
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut RandomNumberGenerator) -> R,
    {
        let cell = self.local.get_or(|| RefCell::new(self.spawn()));
        let mut rng = cell.borrow_mut();
        f(&mut rng)
    }

    fn spawn(&self) -> RandomNumberGenerator {
        match self.seed {
            Some(seed) => {
                let stream = self.next_stream.fetch_add(1, Ordering::Relaxed);
                RandomNumberGenerator::from_seed(seed.wrapping_add(stream.wrapping_mul(STREAM_STRIDE)))
            }
            None => RandomNumberGenerator::new(),
        }
    }
}
