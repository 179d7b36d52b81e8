//! # FRONTIER Core
//!
//! Deterministic randomness for reproducible content generation.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same sequence
//! 2. **Single word of state**: A `SeededRandom` owns exactly one `u32`
//! 3. **Identifier-derived streams**: Sub-seeds come from stable ids, never call counters
//! 4. **Explicit failure**: Empty picks, bad weights and bad dice are errors, not panics
//!
//! ## Core Components
//!
//! - `seed`: `hash_string`, `combine_seeds`, `WorldSeed`
//! - `SeededRandom`: floats, ranges, picks, shuffles, dice, pseudo-UUIDs
//! - `DiceNotation`: `NdM+K` parsing
//!
//! ## Example
//!
//! ```rust
//! use frontier_core::{combine_seeds, hash_string, SeededRandom};
//!
//! let location_seed = combine_seeds(&[12345, hash_string("dry_gulch")]);
//! let mut rng = SeededRandom::new(location_seed);
//!
//! let damage = rng.roll("2d6+1").unwrap();
//! assert!((3..=13).contains(&damage));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod dice;
pub mod error;
pub mod random;
pub mod seed;

pub use dice::DiceNotation;
pub use error::{RandomError, RandomResult};
pub use random::SeededRandom;
pub use seed::{combine_seeds, derive_seed, fold_seed, hash_string, seed_from_str, WorldSeed};
