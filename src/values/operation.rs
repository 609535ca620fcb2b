//! Operations shared by calc values and effects
//!
//! An operation is either one of the four arithmetic operators, folded over
//! the named inputs in order, or an expression template whose `#NAME` tokens
//! are substituted before the result is handed to the dice evaluator.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::format_number;
use crate::dice::DiceEvaluator;
use crate::error::{GvmError, Result};

/// Marker followed by a run of anything but whitespace or `)`
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([^\s)]*)").unwrap());

/// Ordered name → number table an operation is evaluated against
pub type NamedValues = [(String, f64)];

/// The four fixed operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    /// Parse a template that is exactly one operator symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(ArithmeticOp::Add),
            "-" => Some(ArithmeticOp::Subtract),
            "*" => Some(ArithmeticOp::Multiply),
            "/" => Some(ArithmeticOp::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
        }
    }

    fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ArithmeticOp::Add => lhs + rhs,
            ArithmeticOp::Subtract => lhs - rhs,
            ArithmeticOp::Multiply => lhs * rhs,
            ArithmeticOp::Divide => lhs / rhs,
        }
    }
}

/// A calc or effect operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Arithmetic(ArithmeticOp),
    Expression(String),
}

impl Operation {
    pub fn parse(template: &str) -> Self {
        match ArithmeticOp::from_symbol(template) {
            Some(op) => Operation::Arithmetic(op),
            None => Operation::Expression(template.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Operation::Arithmetic(op) => op.symbol(),
            Operation::Expression(template) => template,
        }
    }
}

impl From<&str> for Operation {
    fn from(template: &str) -> Self {
        Operation::parse(template)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names referenced by `#NAME` tokens in a template, in order of appearance
pub fn referenced_names(template: &str) -> Vec<&str> {
    TOKEN_REGEX
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Replace every `#NAME` token with its number.
///
/// The delimiter that ended a token is kept verbatim. Membership decides a
/// match, so a value of `0` is substituted like any other.
///
/// # Examples
/// ```
/// use gvm::values::substitute_tokens;
///
/// let named = vec![("DEX".to_string(), 3.0), ("D20".to_string(), 14.0)];
/// assert_eq!(substitute_tokens("#DEX + #D20", &named).unwrap(), "3 + 14");
/// ```
pub fn substitute_tokens(template: &str, named: &NamedValues) -> Result<String> {
    let mut output = String::with_capacity(template.len());
    let mut last_index = 0usize;

    for caps in TOKEN_REGEX.captures_iter(template) {
        let (Some(full), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if key.as_str().is_empty() {
            return Err(GvmError::EmptyReference(template.to_string()));
        }

        let value = named
            .iter()
            .find(|(name, _)| name == key.as_str())
            .map(|(_, value)| *value)
            .ok_or_else(|| GvmError::UnknownReference(key.as_str().to_string()))?;

        output.push_str(&template[last_index..full.start()]);
        output.push_str(&format_number(value));
        last_index = full.end();
    }

    output.push_str(&template[last_index..]);
    Ok(output)
}

/// Evaluate an operation against an ordered table of named numbers
pub fn perform_operation(
    named: &NamedValues,
    operation: &Operation,
    evaluator: &mut dyn DiceEvaluator,
    log: bool,
) -> Result<f64> {
    match operation {
        Operation::Arithmetic(op) => named
            .iter()
            .map(|(_, value)| *value)
            .reduce(|acc, value| op.apply(acc, value))
            .ok_or_else(|| GvmError::NoOperands(op.symbol().to_string())),
        Operation::Expression(template) => {
            let expression = substitute_tokens(template, named)?;
            if log {
                info!(template = %template, expression = %expression, "evaluating operation");
            } else {
                debug!(template = %template, expression = %expression, "evaluating operation");
            }
            Ok(evaluator.evaluate(&expression)?)
        }
    }
}
