//! # Random Core Error Types
//!
//! All errors that can occur while drawing from a `SeededRandom`.

use thiserror::Error;

/// Errors that can occur in the random core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RandomError {
    /// Attempted to pick from an empty collection.
    #[error("cannot pick from an empty collection")]
    EmptyCollection,

    /// Requested more unique picks than the population holds.
    #[error("cannot pick {requested} unique items from a population of {available}")]
    PickCountExceeded {
        /// Number of unique items requested.
        requested: usize,
        /// Size of the population.
        available: usize,
    },

    /// Items and weights have different lengths.
    #[error("weighted pick needs one weight per item: {items} items, {weights} weights")]
    WeightMismatch {
        /// Number of items.
        items: usize,
        /// Number of weights.
        weights: usize,
    },

    /// Weights are negative, not finite, or sum to zero.
    #[error("weights must be finite, non-negative and sum to a positive total")]
    InvalidWeights,

    /// Dice notation could not be parsed.
    #[error("invalid dice notation: {0:?}")]
    InvalidNotation(String),
}

/// Result type for random core operations.
pub type RandomResult<T> = Result<T, RandomError>;
