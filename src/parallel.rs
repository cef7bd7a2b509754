//! # Parallel execution
//!
//! [`ParallelExecutor`] applies a function to every element of a slice on a
//! fixed number of worker threads. Work is partitioned statically and
//! round-robin: with `T` workers, worker `k` handles indices `k, k + T,
//! k + 2T, ...` in increasing order. A fresh pool is built for each call and
//! torn down before the call returns.
//!
//! Any element function that returns an error raises a shared halt flag.
//! Every worker checks the flag before starting its next element, so work
//! already in flight always finishes. The first error recorded is returned.
//!
//! Reductions go through [`ParallelExecutor::fold`]: each worker accumulates
//! a private partial result and the partials are handed back for the caller
//! to merge once all workers have joined.
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::parallel::ParallelExecutor;
//!
//! let executor = ParallelExecutor::new(4).unwrap();
//! let mut values = vec![1, 2, 3, 4, 5];
//! executor.run(&mut values, |value| {
//!     *value *= 10;
//!     Ok(())
//! }).unwrap();
//! assert_eq!(values, vec![10, 20, 30, 40, 50]);
//!
//! let partials = executor.fold(&values, || 0, |sum, value| {
//!     *sum += *value;
//!     Ok(())
//! }).unwrap();
//! assert_eq!(partials.into_iter().sum::<i32>(), 150);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::trace;

use crate::error::{GeneticError, Result};

/// Runs per-element work on a fixed number of threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelExecutor {
    num_threads: usize,
}

impl ParallelExecutor {
    /// Creates an executor that uses up to `num_threads` workers.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `num_threads` is zero.
    pub fn new(num_threads: usize) -> Result<Self> {
        if num_threads < 1 {
            return Err(GeneticError::Configuration(
                "Thread count must be at least 1".to_string(),
            ));
        }
        Ok(Self { num_threads })
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Applies `func` to every element.
    ///
    /// # Errors
    ///
    /// - `Configuration` if `elements` is empty.
    /// - `ThreadPool` if the workers cannot be spawned.
    /// - The first error returned by `func`, after which the remaining
    ///   workers stop at their next element.
    pub fn run<T, F>(&self, elements: &mut [T], func: F) -> Result<()>
    where
        T: Send,
        F: Fn(&mut T) -> Result<()> + Sync,
    {
        self.dispatch(elements.iter_mut(), || (), |_, element| func(element))
            .map(|_| ())
    }

    /// Like [`run`](Self::run), with a mutable per-worker accumulator.
    ///
    /// Returns one partial per worker, in worker order.
    pub fn fold_mut<T, A, I, F>(&self, elements: &mut [T], init: I, func: F) -> Result<Vec<A>>
    where
        T: Send,
        A: Send,
        I: Fn() -> A + Sync,
        F: Fn(&mut A, &mut T) -> Result<()> + Sync,
    {
        self.dispatch(elements.iter_mut(), init, func)
    }

    /// Read-only reduction: folds every element into a per-worker partial.
    ///
    /// Returns one partial per worker, in worker order.
    pub fn fold<T, A, I, F>(&self, elements: &[T], init: I, func: F) -> Result<Vec<A>>
    where
        T: Sync,
        A: Send,
        I: Fn() -> A + Sync,
        F: Fn(&mut A, &T) -> Result<()> + Sync,
    {
        self.dispatch(elements.iter(), init, func)
    }

    fn dispatch<E, It, A, I, F>(&self, elements: It, init: I, func: F) -> Result<Vec<A>>
    where
        It: ExactSizeIterator<Item = E>,
        E: Send,
        A: Send,
        I: Fn() -> A + Sync,
        F: Fn(&mut A, E) -> Result<()> + Sync,
    {
        let count = elements.len();
        if count == 0 {
            return Err(GeneticError::Configuration(
                "Cannot run a parallel phase over an empty array".to_string(),
            ));
        }
        let workers = self.num_threads.min(count);
        let stripes = stripe(elements, workers);

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("binpack-worker-{}", index))
            .build()?;

        let halted = AtomicBool::new(false);
        let first_error: Mutex<Option<GeneticError>> = Mutex::new(None);

        let partials: Vec<A> = pool.install(|| {
            stripes
                .into_par_iter()
                .enumerate()
                .map(|(worker, stripe)| {
                    let mut partial = init();
                    let mut processed = 0usize;
                    for element in stripe {
                        if halted.load(Ordering::Acquire) {
                            break;
                        }
                        if let Err(err) = func(&mut partial, element) {
                            halted.store(true, Ordering::Release);
                            let mut slot = first_error
                                .lock()
                                .unwrap_or_else(|poisoned| poisoned.into_inner());
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            break;
                        }
                        processed += 1;
                    }
                    trace!(worker, processed, "worker finished");
                    partial
                })
                .collect()
        });

        match first_error
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
        {
            Some(err) => Err(err),
            None => Ok(partials),
        }
    }
}

/// Deals `elements` round-robin into `workers` stripes.
fn stripe<E, It>(elements: It, workers: usize) -> Vec<Vec<E>>
where
    It: ExactSizeIterator<Item = E>,
{
    let per_worker = elements.len().div_ceil(workers);
    let mut stripes: Vec<Vec<E>> = (0..workers)
        .map(|_| Vec::with_capacity(per_worker))
        .collect();
    for (index, element) in elements.enumerate() {
        stripes[index % workers].push(element);
    }
    stripes
}
