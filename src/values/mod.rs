//! Game values - the numbers on a character sheet
//!
//! Four variants share one invocation protocol:
//! - Static: a named constant
//! - Scalar: a bounded value
//! - Die: re-rolled on every invocation
//! - Calc: derived from other values via an operation

mod effect;
mod game_value;
mod operation;

pub use effect::{Effect, SELF_REFERENCE};
pub use game_value::{GameValue, GameValueId, InvokeOptions, ValueKind};
pub use operation::{
    perform_operation, referenced_names, substitute_tokens, ArithmeticOp, NamedValues, Operation,
};

/// Render a number the way it is substituted into expressions and shown on
/// sheets: integral values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
