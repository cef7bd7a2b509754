//! # Error Types
//!
//! This module defines the error type shared by every part of the bin-packing
//! genetic algorithm. It separates configuration mistakes, resource failures,
//! persistence failures and unsupported operators so callers can tell a bad
//! tunable combination apart from a worker thread that could not be spawned.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use binpack_ga::error::{GeneticError, Result};
//!
//! fn check_threads(num_threads: usize) -> Result<()> {
//!     if num_threads == 0 {
//!         return Err(GeneticError::Configuration(
//!             "Thread count must be at least 1".to_string(),
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_threads(0).is_err());
//! ```
//!
//! Using the `ResultExt` trait to add context to errors:
//!
//! ```rust
//! use binpack_ga::error::{Result, ResultExt};
//!
//! fn parse_capacity(token: &str) -> Result<f64> {
//!     token.parse::<f64>().context("Failed to parse bin capacity")
//! }
//!
//! assert!(parse_capacity("150").is_ok());
//! assert!(parse_capacity("full").is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use binpack_ga::error::{GeneticError, OptionExt};
//!
//! fn heaviest(weights: &[f64]) -> binpack_ga::error::Result<f64> {
//!     weights
//!         .iter()
//!         .cloned()
//!         .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
//!         .ok_or_else_genetic(|| GeneticError::EmptyPopulation)
//! }
//!
//! assert_eq!(heaviest(&[1.0, 3.0, 2.0]).unwrap(), 3.0);
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while packing, searching or evolving.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// An invalid tunable combination or invalid executor arguments.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operation that needs at least one chromosome found none.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// A reserved operator was invoked.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Worker threads for a parallel phase could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A problem instance could not be read from its textual form.
    #[error("Parse error: {0}")]
    Parse(String),

    /// NaN, infinite or non-positive weights or capacities.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for bin-packing GA operations.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use binpack_ga::error::ResultExt;
///
/// fn parse_count(token: &str) -> binpack_ga::error::Result<usize> {
///     token.parse::<usize>().context("Failed to parse item count")
/// }
///
/// assert_eq!(parse_count("12").unwrap(), 12);
/// ```
pub trait ResultExt<T, E> {
    /// Adds context to an error.
    ///
    /// This method converts the error to a `GeneticError::Other` carrying the
    /// provided context in front of the original message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an Option to a Result using a closure to generate the error.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}
