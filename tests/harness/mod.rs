//! Integration test harness
//!
//! - `GvmTest` - a manager with a fixed dice seed, optionally preloaded with
//!   the character fixture
//! - `CHARACTER` - the fixture document: public dice and constants, two
//!   players (`P1`, `P2`) and a handful of effects

#![allow(dead_code)]

use gvm::config::GvmConfig;
use gvm::dice::DiceEngine;
use gvm::{GameValueId, GameValueManager};

/// Fixture import document
pub const CHARACTER: &str = include_str!("../fixtures/character.json");

/// Dice seed shared by every harness manager
pub const SEED: u64 = 0x5eed;

/// Seeded manager wrapper with name-based helpers
pub struct GvmTest {
    pub gvm: GameValueManager,
}

impl GvmTest {
    /// Empty manager
    pub fn new() -> Self {
        Self::with_config(GvmConfig::default())
    }

    pub fn with_config(config: GvmConfig) -> Self {
        Self {
            gvm: GameValueManager::with_evaluator(&config, DiceEngine::seeded(SEED)),
        }
    }

    /// Manager with the character fixture imported
    pub fn character() -> Self {
        let mut test = Self::new();
        test.gvm
            .import_json(CHARACTER)
            .expect("fixture should import cleanly");
        test
    }

    /// Resolve a name, panicking if it does not exist
    pub fn id(&self, name: &str, owner: Option<&str>) -> GameValueId {
        self.gvm
            .get_id_by_name(name, owner)
            .unwrap_or_else(|e| panic!("lookup of {} failed: {}", name, e))
    }

    pub fn invoke(&mut self, name: &str, owner: Option<&str>) -> f64 {
        let id = self.id(name, owner);
        self.gvm.invoke_by_id(id).expect("invoke failed")
    }

    pub fn invoke_with(&mut self, name: &str, owner: Option<&str>, effects: &[&str]) -> f64 {
        let id = self.id(name, owner);
        self.gvm
            .invoke_with_effects(id, effects)
            .expect("invoke with effects failed")
    }

    pub fn base(&self, name: &str, owner: Option<&str>) -> f64 {
        self.gvm
            .get_game_value_entry_by_name(name, owner)
            .expect("lookup failed")
            .game_value
            .base_value()
    }
}
