//! # Dice Notation
//!
//! Parses standard tabletop dice notation:
//! - `2d6`   two six-sided dice
//! - `1d4+3` one four-sided die plus three
//! - `3d8-2` three eight-sided dice minus two
//!
//! The count is mandatory. A bare `d6` is rejected so that every roll
//! states how many dice it throws.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RandomError, RandomResult};

/// Maximum number of dice in one notation.
pub const MAX_DICE_COUNT: u32 = 1_000;

/// Maximum number of sides on one die.
pub const MAX_DICE_SIDES: u32 = 1_000_000;

/// Parsed dice notation (`NdM+K`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceNotation {
    /// Number of dice thrown.
    pub count: u32,
    /// Sides per die.
    pub sides: u32,
    /// Flat modifier added to the sum.
    pub modifier: i64,
}

impl DiceNotation {
    /// Creates a validated notation.
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::InvalidNotation`] if count or sides are out of range.
    pub fn new(count: u32, sides: u32, modifier: i64) -> RandomResult<Self> {
        if !(1..=MAX_DICE_COUNT).contains(&count) || !(1..=MAX_DICE_SIDES).contains(&sides) {
            return Err(RandomError::InvalidNotation(format!("{count}d{sides}")));
        }
        Ok(Self { count, sides, modifier })
    }

    /// Parses `NdM`, `NdM+K` or `NdM-K` (case-insensitive, surrounding whitespace ignored).
    ///
    /// # Errors
    ///
    /// Returns [`RandomError::InvalidNotation`] for anything else, including `dM`.
    pub fn parse(notation: &str) -> RandomResult<Self> {
        let invalid = || RandomError::InvalidNotation(notation.to_string());
        let trimmed = notation.trim().to_ascii_lowercase();

        let (count_part, rest) = trimmed.split_once('d').ok_or_else(invalid)?;
        let count = parse_digits(count_part).ok_or_else(invalid)?;

        let (sides_part, modifier) = match rest.find(['+', '-']) {
            Some(index) => {
                let (sides_part, modifier_part) = rest.split_at(index);
                let magnitude = parse_digits(&modifier_part[1..]).ok_or_else(invalid)?;
                let magnitude = i64::from(magnitude);
                let modifier = if modifier_part.starts_with('-') { -magnitude } else { magnitude };
                (sides_part, modifier)
            }
            None => (rest, 0),
        };
        let sides = parse_digits(sides_part).ok_or_else(invalid)?;

        Self::new(count, sides, modifier).map_err(|_| invalid())
    }

    /// Smallest possible total (every die shows 1).
    #[must_use]
    pub fn min_total(&self) -> i64 {
        i64::from(self.count) + self.modifier
    }

    /// Largest possible total (every die shows its maximum).
    #[must_use]
    pub fn max_total(&self) -> i64 {
        i64::from(self.count) * i64::from(self.sides) + self.modifier
    }
}

/// Parses a non-empty run of ASCII digits.
fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

impl FromStr for DiceNotation {
    type Err = RandomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        let dice = DiceNotation::parse("2d6").unwrap();
        assert_eq!(dice, DiceNotation { count: 2, sides: 6, modifier: 0 });
        assert_eq!(dice.min_total(), 2);
        assert_eq!(dice.max_total(), 12);
    }

    #[test]
    fn test_parse_modifiers() {
        let plus = DiceNotation::parse("1d4+3").unwrap();
        assert_eq!((plus.min_total(), plus.max_total()), (4, 7));

        let minus = DiceNotation::parse("3d8-2").unwrap();
        assert_eq!(minus.modifier, -2);
        assert_eq!((minus.min_total(), minus.max_total()), (1, 22));
    }

    #[test]
    fn test_parse_is_lenient_about_case_and_whitespace() {
        assert_eq!(DiceNotation::parse("  2D10 ").unwrap().sides, 10);
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in ["d6", "invalid", "", "2d", "2d6+", "2d6+x", "0d6", "2d0", "2x6", "2d6+1+1", "-2d6"] {
            assert!(
                matches!(DiceNotation::parse(bad), Err(RandomError::InvalidNotation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceNotation::parse("2d6").unwrap().to_string(), "2d6");
        assert_eq!(DiceNotation::parse("1d4+3").unwrap().to_string(), "1d4+3");
        assert_eq!(DiceNotation::parse("3d8-2").unwrap().to_string(), "3d8-2");
        assert_eq!("1d20".parse::<DiceNotation>().unwrap().sides, 20);
    }
}
