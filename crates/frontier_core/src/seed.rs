//! # Seed Utilities
//!
//! Deterministic string hashing and multi-seed combination.
//!
//! ## Determinism Guarantee
//!
//! Every function here is a pure function of its inputs using wrapping
//! 32-bit arithmetic, so results are identical on every platform and
//! for strings of any length.
//!
//! Sub-seeds are always derived from a parent seed plus a stable
//! identifier (entity id, location id, slot index), never from how many
//! things were generated before.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Golden-ratio increment used by the combine step.
const GOLDEN_RATIO_32: u32 = 0x9E37_79B9;

/// Hashes a string to an unsigned 32-bit value.
///
/// Polynomial rolling hash (`h = h * 31 + c`) over Unicode scalar values.
/// The empty string hashes to exactly `0`.
///
/// # Collisions
///
/// This is not a cryptographic or collision-resistant hash. Strings that
/// trade one unit in a position for 31 units in the next collide, e.g.
/// `"Aa"` and `"BB"`, and so do any ids sharing a prefix and suffix around
/// such a pair (`"loc-Aa"` and `"loc-BB"`). Since [`derive_seed`] hashes the
/// identifier before combining, colliding ids get the same sub-seed. Hosts
/// that accept arbitrary ids should make them structurally distinct, as the
/// generated `region-<i>-loc-<j>` ids are.
#[must_use]
pub fn hash_string(s: &str) -> u32 {
    s.chars()
        .fold(0u32, |hash, c| hash.wrapping_mul(31).wrapping_add(u32::from(c)))
}

/// Combines two or more seeds into one.
///
/// Order matters: `combine_seeds(&[1, 2, 3])` and `combine_seeds(&[3, 2, 1])`
/// are expected to differ. For a fixed first seed the result is a bijection
/// of each following seed, so distinct identifiers never collide on the
/// combine step itself.
///
/// An empty slice combines to `0`.
#[must_use]
pub fn combine_seeds(seeds: &[u32]) -> u32 {
    let Some((&first, rest)) = seeds.split_first() else {
        return 0;
    };

    let mut hash = first;
    for &seed in rest {
        hash ^= seed
            .wrapping_add(GOLDEN_RATIO_32)
            .wrapping_add(hash << 6)
            .wrapping_add(hash >> 2);
    }
    avalanche(hash)
}

/// Derives a sub-seed from a parent seed and a stable string identifier.
#[inline]
#[must_use]
pub fn derive_seed(parent: u32, identifier: &str) -> u32 {
    combine_seeds(&[parent, hash_string(identifier)])
}

/// Folds a signed seed into the unsigned range (two's complement).
///
/// Negative seeds never fail: `-1` folds to `u32::MAX`.
#[inline]
#[must_use]
pub const fn fold_seed(seed: i64) -> u32 {
    seed as u32
}

/// Maps a textual seed (e.g. typed by a player) to an integer seed.
#[inline]
#[must_use]
pub fn seed_from_str(seed: &str) -> u32 {
    hash_string(seed)
}

/// 32-bit finalizer so nearby inputs spread across the whole range.
#[inline]
const fn avalanche(mut hash: u32) -> u32 {
    hash ^= hash >> 16;
    hash = hash.wrapping_mul(0x85EB_CA6B);
    hash ^= hash >> 13;
    hash = hash.wrapping_mul(0xC2B2_AE35);
    hash ^ (hash >> 16)
}

/// World seed for deterministic generation.
///
/// All procedural content of one session derives from this seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u32);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Creates a world seed from a signed value.
    #[inline]
    #[must_use]
    pub const fn from_i64(seed: i64) -> Self {
        Self(fold_seed(seed))
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Derives the seed for a specific identifier (location id, region slot...).
    #[inline]
    #[must_use]
    pub fn derive(self, identifier: &str) -> u32 {
        derive_seed(self.0, identifier)
    }
}

impl From<u32> for WorldSeed {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<&str> for WorldSeed {
    fn from(value: &str) -> Self {
        Self(seed_from_str(value))
    }
}

impl fmt::Display for WorldSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_hashes_to_zero() {
        assert_eq!(hash_string(""), 0);
    }

    #[test]
    fn test_hash_is_stable_and_content_sensitive() {
        assert_eq!(hash_string("hello"), hash_string("hello"));
        assert_ne!(hash_string("hello"), hash_string("world"));
        assert_ne!(hash_string("ab"), hash_string("ba"));
    }

    #[test]
    fn test_hash_handles_long_and_unicode_strings() {
        let long = "frontier".repeat(10_000);
        assert_eq!(hash_string(&long), hash_string(&long));
        assert_ne!(hash_string("café"), hash_string("cafe"));
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        assert_ne!(combine_seeds(&[1, 2, 3]), combine_seeds(&[3, 2, 1]));
        assert_eq!(combine_seeds(&[1, 2, 3]), combine_seeds(&[1, 2, 3]));
    }

    #[test]
    fn test_combine_edge_cases() {
        assert_eq!(combine_seeds(&[]), 0);
        assert_eq!(combine_seeds(&[7]), combine_seeds(&[7]));
        assert_ne!(combine_seeds(&[7, 0]), combine_seeds(&[7]));
    }

    #[test]
    fn test_distinct_identifiers_distinct_seeds() {
        let world = 42;
        let mut seen = std::collections::HashSet::new();
        for i in 0..1_000 {
            let seed = derive_seed(world, &format!("location_{i}"));
            assert!(seen.insert(seed), "collision at location_{i}");
        }
    }

    #[test]
    fn test_hash_collisions_carry_into_sub_seeds() {
        assert_eq!(hash_string("Aa"), hash_string("BB"));
        assert_eq!(hash_string("loc-Aa"), hash_string("loc-BB"));
        assert_eq!(derive_seed(42, "loc-Aa"), derive_seed(42, "loc-BB"));
        assert_ne!(derive_seed(42, "loc-Aa"), derive_seed(42, "loc-Ab"));
    }

    #[test]
    fn test_negative_seeds_fold() {
        assert_eq!(fold_seed(-1), u32::MAX);
        assert_eq!(fold_seed(5), 5);
        assert_eq!(WorldSeed::from_i64(-2).value(), u32::MAX - 1);
    }

    #[test]
    fn test_world_seed_derive_matches_free_function() {
        let seed = WorldSeed::new(99);
        assert_eq!(seed.derive("dry_gulch"), derive_seed(99, "dry_gulch"));
        assert_eq!(WorldSeed::from("tumbleweed").value(), hash_string("tumbleweed"));
    }
}
