//! Bulk import of values and effects from a JSON document
//!
//! The document's top-level keys are categories (`static`, `scalar`, `die`,
//! `calc`, `effect`), each holding an array of entries. Categories and their
//! entries are processed strictly in document order, so a calc must come
//! after every value it names.

use tracing::{info, warn};

use super::definition::{ordered_table, CalcDef, Definition, DieDef, EffectDef, ScalarDef, StaticDef};
use super::{Added, GameValueManager};
use crate::config::ImportPolicy;
use crate::dice::DiceRoll;
use crate::error::{GvmError, Result};
use crate::values::{GameValueId, Operation, ValueKind};

/// An entry skipped under [`ImportPolicy::SkipInvalid`]
#[derive(Debug)]
pub struct ImportFailure {
    pub category: String,
    pub index: usize,
    pub entry: String,
    pub error: GvmError,
}

/// Outcome of an import
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub added: Vec<Added>,
    pub failures: Vec<ImportFailure>,
}

impl ImportSummary {
    /// Ids of the imported values, in document order
    pub fn values(&self) -> impl Iterator<Item = GameValueId> + '_ {
        self.added.iter().filter_map(Added::id)
    }

    /// Names of the imported effects (embedded effects excluded)
    pub fn effects(&self) -> impl Iterator<Item = &str> {
        self.added.iter().filter_map(|added| match added {
            Added::Effect(name) => Some(name.as_str()),
            Added::Value(_) => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl GameValueManager {
    /// Import every entry of a JSON document.
    ///
    /// With [`ImportPolicy::FailFast`] the first bad entry aborts the import
    /// with [`GvmError::Import`]; entries before it stay registered. With
    /// [`ImportPolicy::SkipInvalid`] bad entries are logged and collected in
    /// the summary.
    pub fn import_json(&mut self, document: &str) -> Result<ImportSummary> {
        let mut deserializer = serde_json::Deserializer::from_str(document);
        let categories: Vec<(String, Vec<serde_json::Value>)> =
            ordered_table::deserialize(&mut deserializer)?;
        deserializer.end()?;

        let mut summary = ImportSummary::default();
        for (category, entries) in &categories {
            self.create_game_values(category, entries, &mut summary)?;
        }

        info!(
            values = summary.values().count(),
            effects = summary.effects().count(),
            failures = summary.failures.len(),
            "import complete"
        );
        Ok(summary)
    }

    /// Build every entry of one category
    fn create_game_values(
        &mut self,
        category: &str,
        entries: &[serde_json::Value],
        summary: &mut ImportSummary,
    ) -> Result<()> {
        for (index, entry) in entries.iter().enumerate() {
            let result = Definition::from_entry(category, entry).and_then(|def| self.add(def, None));
            match result {
                Ok(added) => summary.added.push(added),
                Err(error) => match self.import_policy {
                    ImportPolicy::FailFast => {
                        return Err(GvmError::Import {
                            category: category.to_string(),
                            index,
                            entry: entry.to_string(),
                            source: Box::new(error),
                        });
                    }
                    ImportPolicy::SkipInvalid => {
                        warn!(category, index, error = %error, "skipping import entry");
                        summary.failures.push(ImportFailure {
                            category: category.to_string(),
                            index,
                            entry: entry.to_string(),
                            error,
                        });
                    }
                },
            }
        }
        Ok(())
    }

    pub fn create_gv_static(&mut self, def: StaticDef) -> Result<GameValueId> {
        self.register_value(def.header, ValueKind::Static)
    }

    pub fn create_gv_scalar(&mut self, def: ScalarDef) -> Result<GameValueId> {
        let kind = ValueKind::Scalar {
            min: def.min,
            max: def.max,
        };
        self.register_value(def.header, kind)
    }

    pub fn create_gv_die(&mut self, def: DieDef) -> Result<GameValueId> {
        let dice = DiceRoll::new(def.quantity, def.sides)?;
        self.register_value(def.header, ValueKind::Die { dice })
    }

    /// Inputs resolve under the entry's own owner and must already exist
    /// Calc inputs are resolved under the entry's own owner and keyed by
    /// name, so each name may appear only once.
    pub fn create_gv_calc(&mut self, def: CalcDef) -> Result<GameValueId> {
        for (i, input) in def.values.iter().enumerate() {
            if def.values[..i].contains(input) {
                return Err(GvmError::DuplicateInput {
                    name: def.header.name.clone(),
                    input: input.clone(),
                });
            }
        }

        let owner = def.header.owner.as_deref();
        let inputs = def
            .values
            .iter()
            .map(|name| self.get_id_by_name(name, owner))
            .collect::<Result<Vec<_>>>()?;
        let kind = ValueKind::Calc {
            inputs,
            operation: Operation::parse(&def.operation),
        };
        self.register_value(def.header, kind)
    }

    pub fn create_effect(&mut self, def: EffectDef) -> Result<String> {
        let effect = self.build_effect(def)?;
        let name = effect.name().to_string();
        self.add_effect(effect)?;
        Ok(name)
    }
}
