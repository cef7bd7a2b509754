//! # Problem instances
//!
//! A [`Problem`] is the immutable input of a run: a bin capacity and the item
//! weights, indexed `0..len()`. Instances are usually read with
//! [`parse_instances`] from the whitespace-separated text format
//!
//! ```text
//! <problem count>
//! <identifier> <capacity> <item count> <optimal bin count> <weight>...
//! ...
//! ```
//!
//! ## Example
//!
//! ```rust
//! use binpack_ga::problem::parse_instances;
//!
//! let problems = parse_instances("1\n u4_00 10 4 2\n 5 5 5 5\n").unwrap();
//! assert_eq!(problems[0].len(), 4);
//! assert_eq!(problems[0].theoretical_min_bins(), 2);
//! ```

use std::str::{FromStr, SplitWhitespace};

use tracing::warn;

use crate::error::{GeneticError, Result};

/// A one-dimensional bin-packing instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    name: String,
    capacity: f64,
    weights: Vec<f64>,
    optimal_bins: Option<usize>,
}

impl Problem {
    /// Creates an unnamed instance.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items, or if the capacity or any
    /// weight is not a positive finite number.
    pub fn new(capacity: f64, weights: Vec<f64>) -> Result<Self> {
        if !(capacity.is_finite() && capacity > 0.0) {
            return Err(GeneticError::InvalidNumericValue(format!(
                "Bin capacity must be positive and finite, got {}",
                capacity
            )));
        }
        if weights.is_empty() {
            return Err(GeneticError::Configuration(
                "A problem instance needs at least one item".to_string(),
            ));
        }
        if let Some((index, weight)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w > 0.0))
        {
            return Err(GeneticError::InvalidNumericValue(format!(
                "Item {} has weight {}, weights must be positive and finite",
                index, weight
            )));
        }

        let oversized = weights.iter().filter(|w| **w > capacity).count();
        if oversized > 0 {
            warn!(oversized, capacity, "items heavier than the bin capacity");
        }

        Ok(Self {
            name: String::new(),
            capacity,
            weights,
            optimal_bins: None,
        })
    }

    /// Sets the instance identifier.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Records the known optimal bin count. It is informational only.
    pub fn with_optimal_bins(mut self, optimal_bins: usize) -> Self {
        self.optimal_bins = Some(optimal_bins);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn optimal_bins(&self) -> Option<usize> {
        self.optimal_bins
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// `ceil(total weight / capacity)`, a lower bound on any packing.
    pub fn theoretical_min_bins(&self) -> usize {
        (self.total_weight() / self.capacity).ceil() as usize
    }
}

/// Parses every instance of a problem file.
///
/// # Errors
///
/// Returns a `Parse` error for missing or malformed tokens and propagates
/// the validation errors of [`Problem::new`].
pub fn parse_instances(input: &str) -> Result<Vec<Problem>> {
    let mut tokens = Tokens {
        inner: input.split_whitespace(),
    };
    let count: usize = tokens.next_value("problem count")?;
    (0..count)
        .map(|index| parse_problem(&mut tokens, index))
        .collect()
}

fn parse_problem(tokens: &mut Tokens<'_>, index: usize) -> Result<Problem> {
    let name = tokens.next_token(&format!("identifier of problem {}", index))?;
    let capacity: f64 = tokens.next_value("bin capacity")?;
    let item_count: usize = tokens.next_value("item count")?;
    let optimal_bins: usize = tokens.next_value("optimal bin count")?;
    let weights = (0..item_count)
        .map(|item| tokens.next_value(&format!("weight of item {}", item)))
        .collect::<Result<Vec<f64>>>()?;

    Ok(Problem::new(capacity, weights)?
        .with_name(name)
        .with_optimal_bins(optimal_bins))
}

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn next_token(&mut self, what: &str) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| GeneticError::Parse(format!("Unexpected end of input, expected {}", what)))
    }

    fn next_value<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.next_token(what)?;
        token
            .parse()
            .map_err(|_| GeneticError::Parse(format!("Invalid {}: '{}'", what, token)))
    }
}
