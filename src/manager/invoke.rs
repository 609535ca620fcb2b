//! Invocation through the manager
//!
//! Calc inputs are stored as ids, so invoking a calc walks the id dictionary
//! recursively: each input is invoked with the caller's options before the
//! calc evaluates its own operation. A calc reached again while it is still
//! being evaluated is a cycle.

use std::collections::HashMap;
use tracing::{debug, info};

use super::{GameValueEntry, GameValueManager};
use crate::dice::DiceEvaluator;
use crate::error::{GvmError, Result};
use crate::values::{
    referenced_names, substitute_tokens, Effect, GameValue, GameValueId, InvokeOptions,
};

impl GameValueManager {
    /// Invoke with effects enabled but none supplied
    pub fn invoke_by_id(&mut self, id: GameValueId) -> Result<f64> {
        self.invoke(id, &InvokeOptions::default())
    }

    /// Invoke a value with caller-supplied options.
    ///
    /// `effect_names` are resolved against the effect registry and applied
    /// after the effects passed directly. An unknown name fails before
    /// anything is invoked.
    pub fn invoke(&mut self, id: GameValueId, options: &InvokeOptions<'_>) -> Result<f64> {
        let mut effects: Vec<&Effect> = options.effects.clone();
        for name in &options.effect_names {
            let effect = self
                .effect_dictionary
                .get(*name)
                .ok_or_else(|| GvmError::EffectNotFound(name.to_string()))?;
            effects.push(effect);
        }

        let resolved = InvokeOptions {
            use_effects: options.use_effects,
            effects,
            effect_names: Vec::new(),
            log: options.log || self.log_eval,
        };
        invoke_value(
            &mut self.id_dictionary,
            &mut *self.evaluator,
            id,
            &resolved,
            &mut Vec::new(),
        )
    }

    /// Invoke a value with registered effects looked up by name
    pub fn invoke_with_effects(&mut self, id: GameValueId, effect_names: &[&str]) -> Result<f64> {
        self.invoke(
            id,
            &InvokeOptions::with_effect_names(effect_names.iter().copied()),
        )
    }

    /// Evaluate an ad hoc roll string.
    ///
    /// Every `#NAME` token is resolved for `owner` (with the default-owner
    /// fallback) and invoked once, then the substituted expression goes to
    /// the dice evaluator.
    ///
    /// ```
    /// use gvm::manager::{GameValueManager, StaticDef};
    ///
    /// let mut gvm = GameValueManager::new();
    /// gvm.add(StaticDef::new("DEX", 3.0), None).unwrap();
    /// assert_eq!(gvm.roll("#DEX * 2", None).unwrap(), 6.0);
    /// ```
    pub fn roll(&mut self, template: &str, owner: Option<&str>) -> Result<f64> {
        let mut named: Vec<(String, f64)> = Vec::new();
        for name in referenced_names(template) {
            if name.is_empty() || named.iter().any(|(n, _)| n == name) {
                continue;
            }
            let id = self.get_id_by_name(name, owner)?;
            let value = self.invoke_by_id(id)?;
            named.push((name.to_string(), value));
        }

        let expression = substitute_tokens(template, &named)?;
        let result = self.evaluator.evaluate(&expression)?;
        if self.log_eval {
            info!(template, expression = %expression, result, "roll");
        } else {
            debug!(template, expression = %expression, result, "roll");
        }
        Ok(result)
    }

    /// Compute the initial state of a value that is not registered yet.
    ///
    /// Dice roll once and calcs evaluate their (registered) inputs, both with
    /// effects disabled. An operation that cannot be evaluated fails here.
    pub(super) fn seed(&mut self, game_value: &mut GameValue) -> Result<f64> {
        let options = InvokeOptions::without_effects();
        let named = invoke_inputs(
            &mut self.id_dictionary,
            &mut *self.evaluator,
            game_value.inputs(),
            &options,
            &mut Vec::new(),
        )?;
        game_value.invoke(&named, &mut *self.evaluator, &options)
    }
}

/// Invoke the value stored under `id`, its calc inputs first
fn invoke_value(
    arena: &mut HashMap<GameValueId, GameValueEntry>,
    evaluator: &mut dyn DiceEvaluator,
    id: GameValueId,
    options: &InvokeOptions<'_>,
    visiting: &mut Vec<GameValueId>,
) -> Result<f64> {
    let entry = arena.get(&id).ok_or(GvmError::IdNotFound(id))?;
    if visiting.contains(&id) {
        return Err(GvmError::Cycle(entry.game_value.name().to_string()));
    }
    let inputs = entry.game_value.inputs().to_vec();

    visiting.push(id);
    let named = invoke_inputs(arena, evaluator, &inputs, options, visiting);
    visiting.pop();
    let named = named?;

    let entry = arena.get_mut(&id).ok_or(GvmError::IdNotFound(id))?;
    entry.game_value.invoke(&named, evaluator, options)
}

/// Invoke each input in order and pair the result with the input's name
fn invoke_inputs(
    arena: &mut HashMap<GameValueId, GameValueEntry>,
    evaluator: &mut dyn DiceEvaluator,
    inputs: &[GameValueId],
    options: &InvokeOptions<'_>,
    visiting: &mut Vec<GameValueId>,
) -> Result<Vec<(String, f64)>> {
    let mut named = Vec::with_capacity(inputs.len());
    for &input in inputs {
        let value = invoke_value(arena, evaluator, input, options, visiting)?;
        let name = arena
            .get(&input)
            .map(|entry| entry.game_value.name().to_string())
            .ok_or(GvmError::IdNotFound(input))?;
        named.push((name, value));
    }
    Ok(named)
}
