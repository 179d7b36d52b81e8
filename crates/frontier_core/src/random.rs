//! # Seeded Random Core
//!
//! A fast, reproducible PRNG with a single 32-bit word of state.
//!
//! ## Determinism Guarantee
//!
//! Every draw advances the state exactly once (Mulberry32 step). Two
//! instances with equal state produce equal sequences on every platform,
//! and cloning an instance reproduces its exact future.
//!
//! The number and order of draws a method makes is part of its contract:
//!
//! | Method          | Draws                                  |
//! |-----------------|----------------------------------------|
//! | `random`        | 1                                      |
//! | `int` / `float` | 1 (also when `min == max`)             |
//! | `bool`          | 1                                      |
//! | `pick`          | 1                                      |
//! | `pick_n`        | `n`                                    |
//! | `weighted_*`    | 1                                      |
//! | `shuffle`       | `len - 1`                              |
//! | `roll`          | one per die                            |
//! | `uuid`          | 4                                      |
//! | `sub_seed`      | 0 (reads state only)                   |
//!
//! **NOT cryptographically secure.** Content generation only.

use serde::{Deserialize, Serialize};

use crate::dice::DiceNotation;
use crate::error::{RandomError, RandomResult};
use crate::seed::{derive_seed, fold_seed, seed_from_str};

/// Mulberry32 state increment.
const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32 as a float, for mapping `u32` draws into `[0, 1)`.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic pseudo-random generator.
///
/// # Example
///
/// ```rust
/// use frontier_core::SeededRandom;
///
/// let mut a = SeededRandom::new(42);
/// let mut b = SeededRandom::new(42);
/// assert_eq!(a.int(1, 100), b.int(1, 100));
///
/// let names = ["Wyatt", "Clementine", "Jesse"];
/// let name = a.pick(&names).unwrap();
/// assert!(names.contains(name));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// Creates a generator from an unsigned seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Creates a generator from a signed seed, folding negatives into range.
    #[inline]
    #[must_use]
    pub const fn from_i64(seed: i64) -> Self {
        Self::new(fold_seed(seed))
    }

    /// Creates a generator from a textual seed.
    #[inline]
    #[must_use]
    pub fn from_str_seed(seed: &str) -> Self {
        Self::new(seed_from_str(seed))
    }

    /// Returns the current state word.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> u32 {
        self.state
    }

    /// Overwrites the state word.
    #[inline]
    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }

    /// Advances the state and returns the next raw 32-bit output.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Returns a float in `[0, 1)`.
    #[inline]
    pub fn random(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Returns an integer in `[min, max]` (inclusive).
    ///
    /// Reversed bounds are swapped. Always consumes exactly one draw.
    pub fn int(&mut self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let span = (i128::from(high) - i128::from(low) + 1) as f64;
        let offset = (self.random() * span).floor() as i128;
        (i128::from(low) + offset).min(i128::from(high)) as i64
    }

    /// Returns a float in `[min, max]`.
    ///
    /// Reversed bounds are swapped. Always consumes exactly one draw.
    pub fn float(&mut self, min: f64, max: f64) -> f64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        (low + self.random() * (high - low)).clamp(low, high)
    }

    /// Returns `true` with probability `p` (clamped to `[0, 1]`).
    pub fn bool(&mut self, p: f64) -> bool {
        let draw = self.random();
        draw < p.clamp(0.0, 1.0)
    }

    /// Uniformly picks one element.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::EmptyCollection`] if `items` is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> RandomResult<&'a T> {
        if items.is_empty() {
            return Err(RandomError::EmptyCollection);
        }
        let index = self.index_below(items.len());
        Ok(&items[index])
    }

    /// Picks `n` distinct elements (by position). Order is not sorted.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::PickCountExceeded`] if `n > items.len()`.
    pub fn pick_n<T: Clone>(&mut self, items: &[T], n: usize) -> RandomResult<Vec<T>> {
        if n > items.len() {
            return Err(RandomError::PickCountExceeded {
                requested: n,
                available: items.len(),
            });
        }

        // Partial Fisher-Yates over positions
        let mut positions: Vec<usize> = (0..items.len()).collect();
        for i in 0..n {
            let j = i + self.index_below(items.len() - i);
            positions.swap(i, j);
        }

        Ok(positions[..n].iter().map(|&i| items[i].clone()).collect())
    }

    /// Picks an index proportionally to `weights`.
    ///
    /// # Errors
    ///
    /// - [`RandomError::EmptyCollection`] if `weights` is empty
    /// - [`RandomError::InvalidWeights`] if any weight is negative or not
    ///   finite, or all weights are zero
    pub fn weighted_index(&mut self, weights: &[f64]) -> RandomResult<usize> {
        if weights.is_empty() {
            return Err(RandomError::EmptyCollection);
        }
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RandomError::InvalidWeights);
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(RandomError::InvalidWeights);
        }

        let roll = self.random() * total;
        let mut cumulative = 0.0;
        let mut last_positive = 0;
        for (index, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            last_positive = index;
            if roll < cumulative {
                return Ok(index);
            }
        }

        // Float rounding can leave `roll` a hair above the final sum
        Ok(last_positive)
    }

    /// Picks one element proportionally to its weight.
    ///
    /// # Errors
    ///
    /// - [`RandomError::WeightMismatch`] if the slices differ in length
    /// - [`RandomError::EmptyCollection`] if both are empty
    /// - [`RandomError::InvalidWeights`] for unusable weights
    pub fn weighted_pick<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> RandomResult<&'a T> {
        if items.len() != weights.len() {
            return Err(RandomError::WeightMismatch {
                items: items.len(),
                weights: weights.len(),
            });
        }
        let index = self.weighted_index(weights)?;
        Ok(&items[index])
    }

    /// Picks one element using a weight read from each element.
    ///
    /// # Errors
    ///
    /// Same as [`Self::weighted_index`].
    pub fn weighted_pick_by<'a, T, F>(&mut self, items: &'a [T], weight: F) -> RandomResult<&'a T>
    where
        F: Fn(&T) -> f64,
    {
        let weights: Vec<f64> = items.iter().map(weight).collect();
        let index = self.weighted_index(&weights)?;
        Ok(&items[index])
    }

    /// Shuffles in place (Fisher-Yates) and hands the same slice back.
    pub fn shuffle<'a, T>(&mut self, items: &'a mut [T]) -> &'a mut [T] {
        for i in (1..items.len()).rev() {
            let j = self.index_below(i + 1);
            items.swap(i, j);
        }
        items
    }

    /// Derives a sub-seed from the current state and an identifier.
    ///
    /// Does not advance the state.
    #[inline]
    #[must_use]
    pub fn sub_seed(&self, identifier: &str) -> u32 {
        derive_seed(self.state, identifier)
    }

    /// Creates an independent generator seeded from [`Self::sub_seed`].
    #[inline]
    #[must_use]
    pub fn child(&self, identifier: &str) -> Self {
        Self::new(self.sub_seed(identifier))
    }

    /// Rolls dice notation such as `2d6` or `1d4+3`.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::InvalidNotation`] for malformed notation.
    pub fn roll(&mut self, notation: &str) -> RandomResult<i64> {
        let dice = DiceNotation::parse(notation)?;
        Ok(self.roll_dice(&dice))
    }

    /// Rolls an already parsed notation.
    pub fn roll_dice(&mut self, dice: &DiceNotation) -> i64 {
        let sum: i64 = (0..dice.count)
            .map(|_| self.int(1, i64::from(dice.sides)))
            .sum();
        sum + dice.modifier
    }

    /// Returns a deterministic version-4 UUID string (8-4-4-4-12 hex).
    pub fn uuid(&mut self) -> String {
        let mut bytes = [0u8; 16];
        for chunk in bytes.chunks_exact_mut(4) {
            chunk.copy_from_slice(&self.next_u32().to_be_bytes());
        }
        uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
    }

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    #[inline]
    fn index_below(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        self.int(0, len as i64 - 1) as usize
    }
}

impl rand::RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        SeededRandom::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(SeededRandom::next_u32(self));
        let low = u64::from(SeededRandom::next_u32(self));
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = SeededRandom::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRandom::new(12345);
        let mut b = SeededRandom::new(12345);
        for _ in 0..1_000 {
            assert_eq!(a.random().to_bits(), b.random().to_bits());
        }
    }

    #[test]
    fn test_different_seeds_diverge_quickly() {
        let mut a = SeededRandom::new(1);
        let mut b = SeededRandom::new(2);
        let left: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let right: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn test_clone_reproduces_future() {
        let mut rng = SeededRandom::new(7);
        rng.random();
        let mut copy = rng.clone();
        for _ in 0..100 {
            assert_eq!(rng.next_u32(), copy.next_u32());
        }
    }

    #[test]
    fn test_random_in_unit_interval() {
        let mut rng = SeededRandom::new(99);
        for _ in 0..10_000 {
            let value = rng.random();
            assert!((0.0..1.0).contains(&value), "out of range: {value}");
        }
    }

    #[test]
    fn test_int_inclusive_bounds() {
        let mut rng = SeededRandom::new(3);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2_000 {
            let value = rng.int(-3, 3);
            assert!((-3..=3).contains(&value));
            seen_min |= value == -3;
            seen_max |= value == 3;
        }
        assert!(seen_min && seen_max, "both bounds should be reachable");
    }

    #[test]
    fn test_degenerate_ranges_consume_one_draw() {
        let mut rng = SeededRandom::new(11);
        let mut reference = rng.clone();
        assert_eq!(rng.int(5, 5), 5);
        assert!((rng.float(2.5, 2.5) - 2.5).abs() < f64::EPSILON);
        reference.next_u32();
        reference.next_u32();
        assert_eq!(rng.state(), reference.state());
    }

    #[test]
    fn test_reversed_bounds_are_swapped() {
        let mut rng = SeededRandom::new(5);
        for _ in 0..500 {
            assert!((1..=6).contains(&rng.int(6, 1)));
        }
    }

    #[test]
    fn test_bool_extremes() {
        let mut rng = SeededRandom::new(17);
        for _ in 0..1_000 {
            assert!(rng.bool(1.0));
            assert!(!rng.bool(0.0));
        }
    }

    #[test]
    fn test_pick_errors_on_empty() {
        let mut rng = SeededRandom::new(1);
        let empty: [u8; 0] = [];
        assert_eq!(rng.pick(&empty), Err(RandomError::EmptyCollection));
    }

    #[test]
    fn test_pick_n_unique_and_bounded() {
        let mut rng = SeededRandom::new(8);
        let items: Vec<u32> = (0..10).collect();
        let picked = rng.pick_n(&items, 10).unwrap();
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);

        assert_eq!(
            rng.pick_n(&items, 11),
            Err(RandomError::PickCountExceeded { requested: 11, available: 10 })
        );
        assert!(rng.pick_n(&items, 0).unwrap().is_empty());
    }

    #[test]
    fn test_weighted_pick_validation() {
        let mut rng = SeededRandom::new(2);
        let empty: [&str; 0] = [];
        assert_eq!(rng.weighted_pick(&empty, &[]), Err(RandomError::EmptyCollection));
        assert_eq!(
            rng.weighted_pick(&["a", "b"], &[1.0]),
            Err(RandomError::WeightMismatch { items: 2, weights: 1 })
        );
        assert_eq!(rng.weighted_pick(&["a"], &[0.0]), Err(RandomError::InvalidWeights));
        assert_eq!(rng.weighted_pick(&["a"], &[-1.0]), Err(RandomError::InvalidWeights));
    }

    #[test]
    fn test_weighted_pick_respects_weights() {
        let mut rng = SeededRandom::new(2024);
        let items = ["common", "rare", "never"];
        let weights = [9.0, 1.0, 0.0];
        let mut common = 0;
        for _ in 0..10_000 {
            let picked = *rng.weighted_pick(&items, &weights).unwrap();
            assert_ne!(picked, "never");
            if picked == "common" {
                common += 1;
            }
        }
        assert!((8_500..9_500).contains(&common), "common picked {common} times");
    }

    #[test]
    fn test_shuffle_preserves_elements() {
        let mut rng = SeededRandom::new(77);
        let mut items: Vec<u32> = (0..50).collect();
        let shuffled = rng.shuffle(&mut items).to_vec();
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
        assert_eq!(items, shuffled);

        let mut again: Vec<u32> = (0..50).collect();
        SeededRandom::new(77).shuffle(&mut again);
        assert_eq!(again, shuffled);
    }

    #[test]
    fn test_sub_seed_does_not_advance() {
        let rng = SeededRandom::new(123);
        assert_eq!(rng.sub_seed("npc"), rng.sub_seed("npc"));
        assert_ne!(rng.sub_seed("npc"), rng.sub_seed("item"));
        assert_eq!(rng.state(), 123);
    }

    #[test]
    fn test_children_match_for_equal_parents() {
        let a = SeededRandom::new(500);
        let b = SeededRandom::new(500);
        let mut child_a = a.child("saloon");
        let mut child_b = b.child("saloon");
        assert_eq!(child_a.next_u32(), child_b.next_u32());
    }

    #[test]
    fn test_roll_ranges() {
        let mut rng = SeededRandom::new(6);
        for _ in 0..1_000 {
            assert!((2..=12).contains(&rng.roll("2d6").unwrap()));
            assert!((4..=7).contains(&rng.roll("1d4+3").unwrap()));
        }
        assert!(matches!(rng.roll("d6"), Err(RandomError::InvalidNotation(_))));
        assert!(matches!(rng.roll("invalid"), Err(RandomError::InvalidNotation(_))));
    }

    #[test]
    fn test_uuid_format_and_uniqueness() {
        let mut rng = SeededRandom::new(31337);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1_000 {
            let id = rng.uuid();
            let groups: Vec<&str> = id.split('-').collect();
            assert_eq!(
                groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
                vec![8, 4, 4, 4, 12]
            );
            assert!(groups[2].starts_with('4'), "version nibble in {id}");
            assert!(matches!(&groups[3][..1], "8" | "9" | "a" | "b"), "variant nibble in {id}");
            assert!(seen.insert(id));
        }
        assert_eq!(SeededRandom::new(1).uuid(), SeededRandom::new(1).uuid());
    }

    #[test]
    fn test_rng_core_interop() {
        use rand::Rng;
        let mut rng = SeededRandom::new(10);
        let value: u8 = rng.gen_range(1..=6);
        assert!((1..=6).contains(&value));
    }

    #[test]
    fn test_signed_and_text_seeds() {
        assert_eq!(SeededRandom::from_i64(-1).state(), u32::MAX);
        assert_eq!(
            SeededRandom::from_str_seed("deadwood").state(),
            crate::seed::hash_string("deadwood")
        );
    }
}
