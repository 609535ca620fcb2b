//! Character sheets
//!
//! A sheet is a named layout of slots. Each slot declares what kind of value
//! it holds and may be bound to a game value registered in a
//! [`GameValueManager`]. The sheet never owns values; it only stores ids and
//! reads through the manager it is handed.
//!
//! Templates are slot layouts with every binding cleared. They are read-only
//! and serve as the starting point for new sheets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{GvmError, Result};
use crate::manager::GameValueManager;
use crate::names::validate_name;
use crate::values::{GameValue, GameValueId, ValueKind};

/// What a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Any game value
    Value,
    Calc,
    Scalar,
    Die,
    /// Free text, never bound to a game value
    Text,
    /// A choice from a list, never bound to a game value
    Option,
}

impl SlotKind {
    pub fn label(&self) -> &'static str {
        match self {
            SlotKind::Value => "value",
            SlotKind::Calc => "calc",
            SlotKind::Scalar => "scalar",
            SlotKind::Die => "die",
            SlotKind::Text => "text",
            SlotKind::Option => "option",
        }
    }

    /// Whether slots of this kind can be bound to a game value
    pub fn binds_values(&self) -> bool {
        !matches!(self, SlotKind::Text | SlotKind::Option)
    }

    /// Whether a value of `kind` fits a slot of this kind
    pub fn accepts(&self, kind: &ValueKind) -> bool {
        match self {
            SlotKind::Value => true,
            SlotKind::Calc => matches!(kind, ValueKind::Calc { .. }),
            SlotKind::Scalar => matches!(kind, ValueKind::Scalar { .. }),
            SlotKind::Die => matches!(kind, ValueKind::Die { .. }),
            SlotKind::Text | SlotKind::Option => false,
        }
    }
}

/// Who a slot's value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotScope {
    /// Shared by every sheet
    Public,
    /// Belongs to the player
    Player,
    /// Belongs to this sheet only
    #[default]
    Sheet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub kind: SlotKind,
    #[serde(default)]
    pub scope: SlotScope,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GameValueId>,
}

impl Slot {
    pub fn new(kind: SlotKind, scope: SlotScope, required: bool) -> Self {
        Self {
            kind,
            scope,
            required,
            id: None,
        }
    }

    pub fn bound_to(mut self, id: GameValueId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_bound(&self) -> bool {
        self.id.is_some()
    }
}

/// A named slot layout over values held by a manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    slots: BTreeMap<String, Slot>,
    #[serde(default)]
    template: bool,
}

impl CharacterSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slots(slots: impl IntoIterator<Item = (String, Slot)>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
            template: false,
        }
    }

    /// Parse a sheet layout from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn slots(&self) -> &BTreeMap<String, Slot> {
        &self.slots
    }

    pub fn is_template(&self) -> bool {
        self.template
    }

    /// A sheet is configured when it is not a template and every required
    /// value slot is bound
    pub fn configured(&self) -> bool {
        !self.template
            && self
                .slots
                .values()
                .filter(|slot| slot.required && slot.kind.binds_values())
                .all(Slot::is_bound)
    }

    pub fn slot(&self, name: &str) -> Result<&Slot> {
        self.slots
            .get(name)
            .ok_or_else(|| GvmError::SlotNotFound(name.to_string()))
    }

    /// Id bound to a slot
    pub fn slot_id(&self, name: &str) -> Result<GameValueId> {
        self.slot(name)?
            .id
            .ok_or_else(|| GvmError::SlotUnbound(name.to_string()))
    }

    /// The game value bound to a slot
    pub fn slot_value<'a>(&self, gvm: &'a GameValueManager, name: &str) -> Result<&'a GameValue> {
        let id = self.slot_id(name)?;
        Ok(&gvm.get_game_value_entry_by_id(id)?.game_value)
    }

    /// Invoke the game value bound to a slot
    pub fn invoke_slot(&self, gvm: &mut GameValueManager, name: &str) -> Result<f64> {
        let id = self.slot_id(name)?;
        gvm.invoke_by_id(id)
    }

    /// Bind a slot to a registered value whose variant fits the slot kind
    pub fn bind_slot(&mut self, gvm: &GameValueManager, name: &str, id: GameValueId) -> Result<()> {
        if self.template {
            return Err(GvmError::TemplateReadOnly);
        }
        let game_value = &gvm.get_game_value_entry_by_id(id)?.game_value;
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| GvmError::SlotNotFound(name.to_string()))?;

        if !slot.kind.accepts(game_value.kind()) {
            return Err(GvmError::SlotKindMismatch {
                slot: name.to_string(),
                expected: slot.kind.label().to_string(),
                name: game_value.name().to_string(),
                found: game_value.kind().label().to_string(),
            });
        }

        debug!(slot = name, value = %game_value.name(), id = %id, "bound sheet slot");
        slot.id = Some(id);
        Ok(())
    }

    /// Add a new slot; existing slots are never replaced
    pub fn add_slot(&mut self, name: &str, slot: Slot) -> Result<()> {
        if self.template {
            return Err(GvmError::TemplateReadOnly);
        }
        validate_name(name)?;
        if self.slots.contains_key(name) {
            return Err(GvmError::SlotTaken(name.to_string()));
        }
        self.slots.insert(name.to_string(), slot);
        Ok(())
    }

    /// Read-only copy of this layout with every binding cleared
    pub fn create_template(&self) -> CharacterSheet {
        let slots = self
            .slots
            .iter()
            .map(|(name, slot)| (name.clone(), Slot { id: None, ..slot.clone() }))
            .collect();
        CharacterSheet {
            slots,
            template: true,
        }
    }

    /// Editable sheet with this layout, for filling in a template
    pub fn instantiate(&self) -> CharacterSheet {
        CharacterSheet {
            slots: self.create_template().slots,
            template: false,
        }
    }

    /// Slot name → short display for every bound slot
    pub fn output(&self, gvm: &GameValueManager) -> BTreeMap<String, String> {
        self.slots
            .iter()
            .filter_map(|(name, slot)| {
                let entry = gvm.get_game_value_entry_by_id(slot.id?).ok()?;
                Some((name.clone(), entry.game_value.display_simple()))
            })
            .collect()
    }
}
