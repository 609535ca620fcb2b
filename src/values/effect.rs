//! Tag-targeted effects
//!
//! An effect is registered once in the manager and applied at invocation time
//! to every value whose tags intersect its target tags.

use std::collections::BTreeSet;

use super::operation::{perform_operation, Operation};
use crate::dice::DiceEvaluator;
use crate::error::Result;

/// Key injected into an effect's table holding the target's effect-free result
pub const SELF_REFERENCE: &str = "self";

/// A named modifier matched to game values by tag
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    name: String,
    values: Vec<(String, f64)>,
    operation: Operation,
    target_tags: BTreeSet<String>,
    negate_base: bool,
}

impl Effect {
    pub(crate) fn new(
        name: &str,
        values: Vec<(String, f64)>,
        operation: Operation,
        target_tags: impl IntoIterator<Item = String>,
        negate_base: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            values,
            operation,
            target_tags: target_tags.into_iter().collect(),
            negate_base,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Named constants available to the operation, in declaration order
    pub fn values(&self) -> &[(String, f64)] {
        &self.values
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn target_tags(&self) -> &BTreeSet<String> {
        &self.target_tags
    }

    pub fn negate_base(&self) -> bool {
        self.negate_base
    }

    /// Whether this effect applies to a value carrying `tags`
    pub fn targets(&self, tags: &BTreeSet<String>) -> bool {
        !self.target_tags.is_disjoint(tags)
    }

    /// Evaluate this effect's contribution against a target whose
    /// effect-free result is `own_result`
    pub(crate) fn evaluate(
        &self,
        own_result: f64,
        evaluator: &mut dyn DiceEvaluator,
        log: bool,
    ) -> Result<f64> {
        let mut named: Vec<(String, f64)> = self
            .values
            .iter()
            .filter(|(key, _)| key != SELF_REFERENCE)
            .cloned()
            .collect();
        named.push((SELF_REFERENCE.to_string(), own_result));

        perform_operation(&named, &self.operation, evaluator, log)
    }
}
