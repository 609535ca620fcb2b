//! Roll-string evaluation
//!
//! Evaluates arithmetic mixed with dice notation:
//! - Operators `+ - * / % ^` (and `**`), unary minus, parentheses
//! - Dice terms `NdM`, `dM`, `Nd%`
//! - Functions `abs ceil floor round sign sqrt min max pow`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::DiceRoll;

/// Deepest nesting of parentheses, calls and unary signs a roll string may use
pub const MAX_DEPTH: usize = 256;

/// Errors produced while evaluating a roll string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiceError {
    #[error("empty roll expression")]
    Empty,

    #[error("unexpected '{found}' at position {pos} in '{expr}'")]
    UnexpectedChar {
        found: char,
        pos: usize,
        expr: String,
    },

    #[error("unexpected end of roll expression '{0}'")]
    UnexpectedEnd(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{name}' expects {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },

    #[error("invalid dice notation: {0}")]
    InvalidDice(String),

    #[error("'{0}' does not evaluate to a finite number")]
    NonFinite(String),

    #[error("roll expression nests deeper than {0} levels")]
    TooDeep(usize),
}

/// Anything that can turn a roll string into a number.
///
/// Calc operations and effects hand their substituted expression to an
/// implementation of this trait. Closures work too, which keeps tests
/// deterministic without a seeded generator.
pub trait DiceEvaluator {
    fn evaluate(&mut self, expression: &str) -> Result<f64, DiceError>;
}

impl<F> DiceEvaluator for F
where
    F: FnMut(&str) -> Result<f64, DiceError>,
{
    fn evaluate(&mut self, expression: &str) -> Result<f64, DiceError> {
        self(expression)
    }
}

/// Default evaluator backed by a `rand` generator
#[derive(Debug, Clone)]
pub struct DiceEngine {
    rng: StdRng,
}

impl DiceEngine {
    /// Deterministic engine for reproducible rolls
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Engine seeded from the thread-local generator
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl Default for DiceEngine {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl DiceEvaluator for DiceEngine {
    fn evaluate(&mut self, expression: &str) -> Result<f64, DiceError> {
        evaluate_with(expression, &mut self.rng)
    }
}

fn evaluate_with<R: Rng>(expression: &str, rng: &mut R) -> Result<f64, DiceError> {
    if expression.trim().is_empty() {
        return Err(DiceError::Empty);
    }

    let mut parser = Parser {
        src: expression,
        chars: expression.chars().collect(),
        pos: 0,
        depth: 0,
        rng,
    };

    let value = parser.expr()?;
    parser.skip_ws();
    if let Some(c) = parser.peek() {
        return Err(parser.unexpected(c));
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(DiceError::NonFinite(expression.to_string()))
    }
}

struct Parser<'a, R: Rng> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    rng: &'a mut R,
}

impl<R: Rng> Parser<'_, R> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, found: char) -> DiceError {
        DiceError::UnexpectedChar {
            found,
            pos: self.pos,
            expr: self.src.to_string(),
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), DiceError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == wanted => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(DiceError::UnexpectedEnd(self.src.to_string())),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<f64, DiceError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some('-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn term(&mut self) -> Result<f64, DiceError> {
        let mut value = self.unary()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') if self.peek_at(1) != Some('*') => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some('/') => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                Some('%') => {
                    self.pos += 1;
                    value %= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    // Every recursive path (parentheses, call arguments, signs, exponents)
    // passes through here
    fn unary(&mut self) -> Result<f64, DiceError> {
        if self.depth >= MAX_DEPTH {
            return Err(DiceError::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let value = self.signed();
        self.depth -= 1;
        value
    }

    fn signed(&mut self) -> Result<f64, DiceError> {
        self.skip_ws();
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(-self.unary()?)
            }
            Some('+') => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    // power := atom (('^' | '**') unary)?   (right associative)
    fn power(&mut self) -> Result<f64, DiceError> {
        let base = self.atom()?;
        self.skip_ws();
        match (self.peek(), self.peek_at(1)) {
            (Some('^'), _) => {
                self.pos += 1;
                Ok(base.powf(self.unary()?))
            }
            (Some('*'), Some('*')) => {
                self.pos += 2;
                Ok(base.powf(self.unary()?))
            }
            _ => Ok(base),
        }
    }

    fn atom(&mut self) -> Result<f64, DiceError> {
        self.skip_ws();
        let c = self
            .peek()
            .ok_or_else(|| DiceError::UnexpectedEnd(self.src.to_string()))?;

        if c == '(' {
            self.pos += 1;
            let value = self.expr()?;
            self.expect(')')?;
            return Ok(value);
        }

        if c.is_ascii_digit() || c == '.' {
            let number = self.number()?;
            if matches!(self.peek(), Some('d' | 'D')) {
                self.pos += 1;
                return self.dice(number);
            }
            return Ok(number);
        }

        if matches!(c, 'd' | 'D') && matches!(self.peek_at(1), Some('0'..='9' | '%')) {
            self.pos += 1;
            return self.dice(1.0);
        }

        if c.is_ascii_alphabetic() {
            return self.call();
        }

        Err(self.unexpected(c))
    }

    fn number(&mut self) -> Result<f64, DiceError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>().map_err(|_| DiceError::UnexpectedChar {
            found: self.chars[start],
            pos: start,
            expr: self.src.to_string(),
        })
    }

    fn integer(&mut self) -> Result<u32, DiceError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return match self.peek() {
                Some(c) => Err(self.unexpected(c)),
                None => Err(DiceError::UnexpectedEnd(self.src.to_string())),
            };
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<u32>()
            .map_err(|_| DiceError::InvalidDice(format!("Invalid die sides: {}", text)))
    }

    // Called with the 'd' already consumed
    fn dice(&mut self, count: f64) -> Result<f64, DiceError> {
        if count.fract() != 0.0 || count < 0.0 || count > u32::MAX as f64 {
            return Err(DiceError::InvalidDice(format!(
                "Invalid dice count: {}",
                count
            )));
        }

        let sides = if self.peek() == Some('%') {
            self.pos += 1;
            100
        } else {
            self.integer()?
        };

        let roll = DiceRoll::new(count as u32, sides)?;
        Ok(roll.roll(&mut *self.rng) as f64)
    }

    fn call(&mut self) -> Result<f64, DiceError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos]
            .iter()
            .collect::<String>()
            .to_lowercase();

        self.expect('(')?;
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() != Some(')') {
            loop {
                args.push(self.expr()?);
                self.skip_ws();
                if self.peek() == Some(',') {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(')')?;

        apply_function(&name, &args)
    }
}

fn apply_function(name: &str, args: &[f64]) -> Result<f64, DiceError> {
    let arity = |expected: &'static str| DiceError::Arity {
        name: name.to_string(),
        expected,
        found: args.len(),
    };
    let unary = |f: fn(f64) -> f64| match args {
        [x] => Ok(f(*x)),
        _ => Err(arity("1")),
    };

    match name {
        "abs" => unary(f64::abs),
        "ceil" => unary(f64::ceil),
        "floor" => unary(f64::floor),
        // Halves round toward positive infinity
        "round" => unary(|x| (x + 0.5).floor()),
        "sign" => unary(|x| if x == 0.0 { 0.0 } else { x.signum() }),
        "sqrt" => unary(f64::sqrt),
        "pow" => match args {
            [base, exp] => Ok(base.powf(*exp)),
            _ => Err(arity("2")),
        },
        "min" => args
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or_else(|| arity("at least 1")),
        "max" => args
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or_else(|| arity("at least 1")),
        _ => Err(DiceError::UnknownFunction(name.to_string())),
    }
}
