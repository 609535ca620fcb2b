//! gvm - game value manager
//!
//! Evaluation engine for tabletop character sheets. Named numbers (constants,
//! bounded scalars, dice and derived calculations) are registered per owner in
//! a [`GameValueManager`], modified at invocation time by tag-targeted
//! effects, and laid out on [`CharacterSheet`]s.

pub mod config;
pub mod dice;
pub mod error;
pub mod manager;
pub mod names;
pub mod sheet;
pub mod values;

pub use config::{GvmConfig, ImportPolicy, DEFAULT_OWNER};
pub use dice::{DiceEngine, DiceError, DiceEvaluator};
pub use error::{ErrorKind, GvmError, Result};
pub use manager::{Definition, GameValueEntry, GameValueManager, ImportSummary};
pub use sheet::{CharacterSheet, Slot, SlotKind, SlotScope};
pub use values::{Effect, GameValue, GameValueId, InvokeOptions, ValueKind};
