//! Game value manager
//!
//! The manager is the sole owner of every game value and effect. Values are
//! indexed three ways:
//! - `id_dictionary`: id → entry (owner and value)
//! - `name_lookup`: name → owner → id
//! - `value_owners`: owner → ids
//!
//! Names resolve per owner, falling back to the default (public) owner.
//! Effects live in a flat, globally named registry and are handed to values
//! per invocation.

mod definition;
mod import;
mod invoke;

pub use definition::{CalcDef, Definition, DieDef, EffectDef, ScalarDef, StaticDef, ValueHeader};
pub use import::{ImportFailure, ImportSummary};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::config::{GvmConfig, ImportPolicy};
use crate::dice::DiceEvaluator;
use crate::error::{GvmError, Result};
use crate::names::{validate_name, validate_owner};
use crate::values::{Effect, GameValue, GameValueId, Operation, ValueKind};

/// A value together with the owner it is registered under
#[derive(Debug, Clone)]
pub struct GameValueEntry {
    pub owner: String,
    pub game_value: GameValue,
}

/// What an `add` registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Added {
    Value(GameValueId),
    Effect(String),
}

impl Added {
    /// The new value's id, if a value was added
    pub fn id(&self) -> Option<GameValueId> {
        match self {
            Added::Value(id) => Some(*id),
            Added::Effect(_) => None,
        }
    }
}

/// Registry of every game value and effect
pub struct GameValueManager {
    id_dictionary: HashMap<GameValueId, GameValueEntry>,
    name_lookup: HashMap<String, HashMap<String, GameValueId>>,
    value_owners: HashMap<String, HashSet<GameValueId>>,
    effect_dictionary: HashMap<String, Effect>,
    reserved_dictionary: HashSet<String>,
    default_owner: String,
    evaluator: Box<dyn DiceEvaluator>,
    import_policy: ImportPolicy,
    log_eval: bool,
}

impl fmt::Debug for GameValueManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameValueManager")
            .field("values", &self.id_dictionary.len())
            .field("effects", &self.effect_dictionary.len())
            .field("owners", &self.value_owners.len())
            .field("default_owner", &self.default_owner)
            .field("import_policy", &self.import_policy)
            .finish_non_exhaustive()
    }
}

impl Default for GameValueManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GameValueManager {
    /// Manager with the default configuration and an entropy-seeded dice engine
    pub fn new() -> Self {
        Self::from_config(&GvmConfig::default())
    }

    pub fn from_config(config: &GvmConfig) -> Self {
        Self::with_evaluator(config, config.dice_engine())
    }

    /// Manager that hands every expression to `evaluator`
    pub fn with_evaluator(config: &GvmConfig, evaluator: impl DiceEvaluator + 'static) -> Self {
        Self {
            id_dictionary: HashMap::new(),
            name_lookup: HashMap::new(),
            value_owners: HashMap::new(),
            effect_dictionary: HashMap::new(),
            reserved_dictionary: config.reserved_strings().map(str::to_string).collect(),
            default_owner: config.default_owner.clone(),
            evaluator: Box::new(evaluator),
            import_policy: config.import_policy,
            log_eval: config.log_eval,
        }
    }

    pub fn default_owner(&self) -> &str {
        &self.default_owner
    }

    pub fn import_policy(&self) -> ImportPolicy {
        self.import_policy
    }

    pub fn set_import_policy(&mut self, policy: ImportPolicy) {
        self.import_policy = policy;
    }

    pub fn is_reserved(&self, string: &str) -> bool {
        self.reserved_dictionary.contains(string)
    }

    /// Number of registered values
    pub fn len(&self) -> usize {
        self.id_dictionary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_dictionary.is_empty()
    }

    /// Owners with at least one registered value, sorted
    pub fn owners(&self) -> Vec<&str> {
        let mut owners: Vec<&str> = self.value_owners.keys().map(String::as_str).collect();
        owners.sort_unstable();
        owners
    }

    /// Create and register a value or effect.
    ///
    /// An explicit `owner` replaces the definition's own owner field.
    /// Reserved names and owners are rejected, as are duplicate
    /// `(name, owner)` pairs and duplicate effect names. Nothing is
    /// registered when the definition fails.
    pub fn add(&mut self, definition: impl Into<Definition>, owner: Option<&str>) -> Result<Added> {
        let mut definition = definition.into();
        if let Some(owner) = owner {
            definition.set_owner(owner);
        }

        let category = definition.category();
        let name = definition.name().to_string();
        let result = match definition {
            Definition::Static(def) => self.create_gv_static(def).map(Added::Value),
            Definition::Scalar(def) => self.create_gv_scalar(def).map(Added::Value),
            Definition::Die(def) => self.create_gv_die(def).map(Added::Value),
            Definition::Calc(def) => self.create_gv_calc(def).map(Added::Value),
            Definition::Effect(def) => self.create_effect(def).map(Added::Effect),
        };

        if let Err(e) = &result {
            warn!(category, name = %name, error = %e, "rejected definition");
        }
        result
    }

    /// Register a built value under `owner` (the default owner if `None`)
    pub(crate) fn add_game_value(
        &mut self,
        game_value: GameValue,
        owner: Option<&str>,
    ) -> Result<GameValueId> {
        let owner = owner.unwrap_or(&self.default_owner).to_string();
        self.check_name_free(game_value.name(), &owner)?;

        let id = game_value.id();
        self.name_lookup
            .entry(game_value.name().to_string())
            .or_default()
            .insert(owner.clone(), id);
        self.value_owners.entry(owner.clone()).or_default().insert(id);
        debug!(name = %game_value.name(), owner = %owner, id = %id, kind = game_value.kind().label(), "registered game value");
        self.id_dictionary.insert(id, GameValueEntry { owner, game_value });

        Ok(id)
    }

    /// Register an effect under its (globally unique) name
    pub(crate) fn add_effect(&mut self, effect: Effect) -> Result<()> {
        self.check_effect_name_free(effect.name())?;
        debug!(name = %effect.name(), targets = ?effect.target_tags(), "registered effect");
        self.effect_dictionary
            .insert(effect.name().to_string(), effect);
        Ok(())
    }

    /// Remove a value from every index.
    ///
    /// A supplied owner must match the entry's owner. Values that are an
    /// input of a registered calc cannot be removed.
    pub fn remove(&mut self, id: GameValueId, owner: Option<&str>) -> Result<GameValue> {
        let entry = self.get_game_value_entry_by_id(id)?;
        if let Some(requested) = owner {
            if requested != entry.owner {
                return Err(GvmError::OwnerMismatch {
                    id,
                    requested: requested.to_string(),
                    actual: entry.owner.clone(),
                });
            }
        }

        if let Some(dependent) = self
            .id_dictionary
            .values()
            .find(|other| other.game_value.inputs().contains(&id))
        {
            return Err(GvmError::InUse {
                name: entry.game_value.name().to_string(),
                dependent: dependent.game_value.name().to_string(),
            });
        }

        let GameValueEntry { owner, game_value } = self
            .id_dictionary
            .remove(&id)
            .ok_or(GvmError::IdNotFound(id))?;

        if let Some(owners) = self.name_lookup.get_mut(game_value.name()) {
            owners.remove(&owner);
            if owners.is_empty() {
                self.name_lookup.remove(game_value.name());
            }
        }
        if let Some(ids) = self.value_owners.get_mut(&owner) {
            ids.remove(&id);
            if ids.is_empty() {
                self.value_owners.remove(&owner);
            }
        }

        debug!(name = %game_value.name(), owner = %owner, id = %id, "removed game value");
        Ok(game_value)
    }

    /// Resolve a name for `owner` (default owner if `None`), falling back to
    /// the default owner's value of the same name
    pub fn get_id_by_name(&self, name: &str, owner: Option<&str>) -> Result<GameValueId> {
        let owner = owner.unwrap_or(&self.default_owner);
        self.name_lookup
            .get(name)
            .and_then(|owners| {
                owners
                    .get(owner)
                    .or_else(|| owners.get(&self.default_owner))
            })
            .copied()
            .ok_or_else(|| GvmError::NameNotFound {
                name: name.to_string(),
                owner: owner.to_string(),
            })
    }

    pub fn get_game_value_entry_by_id(&self, id: GameValueId) -> Result<&GameValueEntry> {
        self.id_dictionary
            .get(&id)
            .ok_or(GvmError::IdNotFound(id))
    }

    pub fn get_game_value_entry_by_name(
        &self,
        name: &str,
        owner: Option<&str>,
    ) -> Result<&GameValueEntry> {
        let id = self.get_id_by_name(name, owner)?;
        self.get_game_value_entry_by_id(id)
    }

    pub fn effect(&self, name: &str) -> Result<&Effect> {
        self.effect_dictionary
            .get(name)
            .ok_or_else(|| GvmError::EffectNotFound(name.to_string()))
    }

    /// Registered effects, in no particular order
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.effect_dictionary.values()
    }

    pub fn remove_effect(&mut self, name: &str) -> Result<Effect> {
        let effect = self
            .effect_dictionary
            .remove(name)
            .ok_or_else(|| GvmError::EffectNotFound(name.to_string()))?;
        debug!(name, "removed effect");
        Ok(effect)
    }

    /// Overwrite a value's base (scalars enforce their bounds)
    pub fn set_value(&mut self, id: GameValueId, value: f64) -> Result<f64> {
        self.game_value_mut(id)?.set_value(value)
    }

    /// Add deltas to a scalar, clamping unless `strict`
    pub fn set_sum(&mut self, id: GameValueId, deltas: &[f64], strict: bool) -> Result<f64> {
        self.game_value_mut(id)?.set_sum(deltas, strict)
    }

    pub fn set_threshold(
        &mut self,
        id: GameValueId,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<()> {
        self.game_value_mut(id)?.set_threshold(min, max)
    }

    /// Sheet for `owner`: every default-owner value plus the owner's own,
    /// keyed by name. Owner values shadow default-owner values of the same
    /// name.
    pub fn output_sheet(&self, owner: Option<&str>) -> BTreeMap<String, String> {
        let mut sheet = BTreeMap::new();
        let mut owners = vec![self.default_owner.as_str()];
        if let Some(owner) = owner.filter(|o| *o != self.default_owner) {
            owners.push(owner);
        }

        for owner in owners {
            let Some(ids) = self.value_owners.get(owner) else {
                continue;
            };
            for id in ids {
                if let Some(entry) = self.id_dictionary.get(id) {
                    sheet.insert(
                        entry.game_value.name().to_string(),
                        entry.game_value.display_simple(),
                    );
                }
            }
        }

        sheet
    }

    /// Verbose description; calcs also list their input names
    pub fn display(&self, id: GameValueId) -> Result<String> {
        let game_value = &self.get_game_value_entry_by_id(id)?.game_value;
        let mut text = game_value.display();
        if let ValueKind::Calc { inputs, .. } = game_value.kind() {
            let names = inputs
                .iter()
                .map(|input| {
                    self.id_dictionary
                        .get(input)
                        .map(|entry| entry.game_value.name())
                        .unwrap_or("?")
                })
                .collect::<Vec<_>>();
            text.push_str(&format!(" [{}]", names.join(", ")));
        }
        Ok(text)
    }

    fn game_value_mut(&mut self, id: GameValueId) -> Result<&mut GameValue> {
        self.id_dictionary
            .get_mut(&id)
            .map(|entry| &mut entry.game_value)
            .ok_or(GvmError::IdNotFound(id))
    }

    /// Owner a new value is registered under. Only an absent owner maps to
    /// the default owner; reserved strings, the default owner token
    /// included, are never accepted as an explicit owner.
    fn resolve_owner(&self, owner: Option<&str>) -> Result<String> {
        match owner {
            None => Ok(self.default_owner.clone()),
            Some(owner) => {
                validate_owner(owner)?;
                if self.is_reserved(owner) {
                    return Err(GvmError::Reserved(owner.to_string()));
                }
                Ok(owner.to_string())
            }
        }
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        if self.is_reserved(name) {
            return Err(GvmError::Reserved(name.to_string()));
        }
        Ok(())
    }

    fn check_name_free(&self, name: &str, owner: &str) -> Result<()> {
        let taken = self
            .name_lookup
            .get(name)
            .is_some_and(|owners| owners.contains_key(owner));
        if taken {
            return Err(GvmError::NameTaken {
                name: name.to_string(),
                owner: owner.to_string(),
            });
        }
        Ok(())
    }

    fn check_effect_name_free(&self, name: &str) -> Result<()> {
        if self.effect_dictionary.contains_key(name) {
            return Err(GvmError::EffectTaken(name.to_string()));
        }
        Ok(())
    }

    /// Build an effect from its definition without registering it
    fn build_effect(&self, def: EffectDef) -> Result<Effect> {
        self.check_new_name(&def.name)?;
        Ok(Effect::new(
            &def.name,
            def.values,
            Operation::parse(&def.operation),
            def.target_tags,
            def.negate_base,
        ))
    }

    /// Validate, build, seed and register a value with its embedded effects.
    ///
    /// Every check runs before anything is registered, so a failed value
    /// leaves the manager untouched.
    fn register_value(&mut self, header: ValueHeader, kind: ValueKind) -> Result<GameValueId> {
        let ValueHeader {
            base_val,
            name,
            owner,
            effects,
            tags,
        } = header;

        let owner = self.resolve_owner(owner.as_deref())?;
        self.check_new_name(&name)?;
        self.check_name_free(&name, &owner)?;

        let mut embedded = Vec::with_capacity(effects.len());
        for def in effects {
            let effect = self.build_effect(def)?;
            self.check_effect_name_free(effect.name())?;
            if embedded.iter().any(|e: &Effect| e.name() == effect.name()) {
                return Err(GvmError::EffectTaken(effect.name().to_string()));
            }
            embedded.push(effect);
        }

        let mut game_value = GameValue::new(&name, base_val, kind, tags)?;
        self.seed(&mut game_value)?;

        for effect in embedded {
            self.add_effect(effect)?;
        }
        self.add_game_value(game_value, Some(&owner))
    }
}
