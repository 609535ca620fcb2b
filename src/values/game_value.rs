//! Game value types and the per-variant invocation protocol

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::operation::{perform_operation, NamedValues, Operation};
use super::{format_number, Effect};
use crate::dice::{DiceEvaluator, DiceRoll};
use crate::error::{GvmError, Result};

/// Globally unique game value identifier (never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameValueId(Uuid);

impl GameValueId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GameValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for GameValueId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Variant-specific state
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// A named constant
    Static,
    /// A value held within inclusive bounds
    Scalar { min: f64, max: f64 },
    /// Re-rolled on every invocation
    Die { dice: DiceRoll },
    /// Derived from other values, re-invoked on every invocation
    Calc {
        inputs: Vec<GameValueId>,
        operation: Operation,
    },
}

impl ValueKind {
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::Static => "static",
            ValueKind::Scalar { .. } => "scalar",
            ValueKind::Die { .. } => "die",
            ValueKind::Calc { .. } => "calc",
        }
    }
}

/// Options for a single invocation.
///
/// Effects are supplied per call and never stored on the value, so the same
/// value can be invoked with a different modifier set each time. Effects can
/// be passed directly or named; names are looked up in the manager's effect
/// registry when the manager invokes.
#[derive(Debug, Clone)]
pub struct InvokeOptions<'a> {
    pub use_effects: bool,
    pub effects: Vec<&'a Effect>,
    pub effect_names: Vec<&'a str>,
    pub log: bool,
}

impl Default for InvokeOptions<'_> {
    fn default() -> Self {
        Self {
            use_effects: true,
            effects: Vec::new(),
            effect_names: Vec::new(),
            log: false,
        }
    }
}

impl<'a> InvokeOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip effect application entirely
    pub fn without_effects() -> Self {
        Self {
            use_effects: false,
            ..Self::default()
        }
    }

    /// Apply the given effects wherever their tags match
    pub fn with_effects(effects: impl IntoIterator<Item = &'a Effect>) -> Self {
        Self {
            effects: effects.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Apply registered effects by name
    pub fn with_effect_names(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            effect_names: names.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn logged(mut self, log: bool) -> Self {
        self.log = log;
        self
    }
}

/// A named, identified number on a character sheet
#[derive(Debug, Clone)]
pub struct GameValue {
    id: GameValueId,
    name: String,
    base_value: f64,
    effective_value: f64,
    tags: BTreeSet<String>,
    kind: ValueKind,
}

impl GameValue {
    /// Build a value, enforcing the variant's invariants on the initial base
    pub(crate) fn new(
        name: &str,
        base_value: f64,
        kind: ValueKind,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        if let ValueKind::Scalar { min, max } = kind {
            if !(min <= max) {
                return Err(GvmError::InvalidBounds { min, max });
            }
            check_bounds(base_value, min, max)?;
        }

        Ok(Self {
            id: GameValueId::generate(),
            name: name.to_string(),
            base_value,
            effective_value: base_value,
            tags: tags.into_iter().collect(),
            kind,
        })
    }

    pub fn id(&self) -> GameValueId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Result of the most recent invocation (or the base if never invoked)
    pub fn effective_value(&self) -> f64 {
        self.effective_value
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Calc inputs in order; empty for every other variant
    pub fn inputs(&self) -> &[GameValueId] {
        match &self.kind {
            ValueKind::Calc { inputs, .. } => inputs,
            _ => &[],
        }
    }

    /// Whether an effect applies to this value
    pub fn is_targeted_by(&self, effect: &Effect) -> bool {
        effect.targets(&self.tags)
    }

    /// Overwrite the base. Scalars reject values outside their bounds.
    ///
    /// The display state follows the new base until the next invocation.
    pub fn set_value(&mut self, value: f64) -> Result<f64> {
        if let ValueKind::Scalar { min, max } = self.kind {
            check_bounds(value, min, max)?;
        }
        self.base_value = value;
        self.effective_value = value;
        Ok(value)
    }

    /// Add deltas to a scalar's base.
    ///
    /// Out-of-range sums clamp to the nearest bound, unless `strict` is set,
    /// in which case they are rejected and the base is left unchanged.
    pub fn set_sum(&mut self, deltas: &[f64], strict: bool) -> Result<f64> {
        let ValueKind::Scalar { min, max } = self.kind else {
            return Err(GvmError::NotScalar(self.name.clone()));
        };

        let target = self.base_value + deltas.iter().sum::<f64>();
        let target = if strict { target } else { target.clamp(min, max) };
        self.set_value(target)
    }

    /// Move a scalar's bounds; `None` keeps the current bound
    pub fn set_threshold(&mut self, min: Option<f64>, max: Option<f64>) -> Result<()> {
        let ValueKind::Scalar {
            min: cur_min,
            max: cur_max,
        } = self.kind
        else {
            return Err(GvmError::NotScalar(self.name.clone()));
        };

        let min = min.unwrap_or(cur_min);
        let max = max.unwrap_or(cur_max);
        if !(min <= max) {
            return Err(GvmError::InvalidBounds { min, max });
        }
        check_bounds(self.base_value, min, max)?;

        self.kind = ValueKind::Scalar { min, max };
        Ok(())
    }

    /// Full invocation given the already-invoked calc inputs
    pub(crate) fn invoke(
        &mut self,
        inputs: &NamedValues,
        evaluator: &mut dyn DiceEvaluator,
        options: &InvokeOptions<'_>,
    ) -> Result<f64> {
        self.refresh_base(inputs, evaluator, options.log)?;
        self.apply_effects(evaluator, options)
    }

    /// Recompute the base for variants that derive it
    fn refresh_base(
        &mut self,
        inputs: &NamedValues,
        evaluator: &mut dyn DiceEvaluator,
        log: bool,
    ) -> Result<f64> {
        match &self.kind {
            ValueKind::Static | ValueKind::Scalar { .. } => {}
            ValueKind::Die { dice } => {
                self.base_value = evaluator.evaluate(&dice.to_string())?;
            }
            ValueKind::Calc { operation, .. } => {
                self.base_value = perform_operation(inputs, operation, evaluator, log)?;
            }
        }
        Ok(self.base_value)
    }

    /// Layer matching effects over the base and cache the result
    fn apply_effects(
        &mut self,
        evaluator: &mut dyn DiceEvaluator,
        options: &InvokeOptions<'_>,
    ) -> Result<f64> {
        let base = self.base_value;
        let mut modifier = 0.0;
        let mut negate_base = false;

        if options.use_effects {
            for effect in options.effects.iter().filter(|e| self.is_targeted_by(e)) {
                modifier += effect.evaluate(base, evaluator, options.log)?;
                negate_base |= effect.negate_base();
            }
        }

        // A negating effect removes the base contribution once
        let total = if negate_base { modifier } else { base + modifier };
        self.effective_value = total;
        Ok(total)
    }

    /// Verbose one-line description
    pub fn display(&self) -> String {
        let value = format_number(self.effective_value);
        match &self.kind {
            ValueKind::Static => format!("{}: {}", self.name, value),
            ValueKind::Scalar { min, max } => format!(
                "{}: {} < {} | {} >",
                self.name,
                value,
                format_number(*min),
                format_number(*max)
            ),
            ValueKind::Die { dice } => format!("{}: {} <{}>", self.name, value, dice),
            ValueKind::Calc { operation, .. } => {
                format!("{}: {} = {{{}}}", self.name, value, operation)
            }
        }
    }

    /// Short form used on sheets
    pub fn display_simple(&self) -> String {
        let value = format_number(self.effective_value);
        match &self.kind {
            ValueKind::Static | ValueKind::Calc { .. } => value,
            ValueKind::Scalar { max, .. } => format!("{} / {}", value, format_number(*max)),
            ValueKind::Die { dice } => format!("{} ({})", value, dice),
        }
    }
}

fn check_bounds(value: f64, min: f64, max: f64) -> Result<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(GvmError::OutOfBounds { value, min, max })
    }
}
