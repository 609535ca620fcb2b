//! Dice system
//!
//! Evaluates roll strings for die values, calc operations and effects:
//! - Plain notation ("2d6+3", "1d20")
//! - Arithmetic with embedded dice and functions ("1d20 + floor((14 - 10) / 2)")

mod eval;
mod notation;

pub use eval::{DiceEngine, DiceError, DiceEvaluator, MAX_DEPTH};
pub use notation::{DiceRoll, MAX_DICE};
