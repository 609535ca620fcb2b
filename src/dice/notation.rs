//! Dice notation
//!
//! A single `NdM` term, as held by die values and built for every dice term
//! the evaluator meets.

use rand::Rng;

use super::DiceError;

/// Most dice a single term may roll
pub const MAX_DICE: u32 = 10_000;

/// A number of identical dice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
}

impl DiceRoll {
    /// Create a new dice roll, rejecting zero dice, zero sides and more
    /// than [`MAX_DICE`] dice
    pub fn new(count: u32, sides: u32) -> Result<Self, DiceError> {
        if count == 0 {
            return Err(DiceError::InvalidDice(
                "Dice count must be at least 1".to_string(),
            ));
        }
        if count > MAX_DICE {
            return Err(DiceError::InvalidDice(format!(
                "Dice count {} exceeds {}",
                count, MAX_DICE
            )));
        }
        if sides == 0 {
            return Err(DiceError::InvalidDice(
                "Die sides must be at least 1".to_string(),
            ));
        }
        Ok(Self { count, sides })
    }

    /// Roll the dice with the given generator and return the total
    pub fn roll<R: Rng>(&self, rng: &mut R) -> i64 {
        let mut total = 0i64;
        for _ in 0..self.count {
            total += i64::from(rng.random_range(1..=self.sides));
        }
        total
    }
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)
    }
}
