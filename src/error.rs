//! Error types for the game value manager

use thiserror::Error;

use crate::dice::DiceError;
use crate::values::GameValueId;

/// Coarse classification of every failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown id, name/owner combination, effect, slot or expression reference
    NotFound,
    /// Duplicate names, reserved strings, removal of a value still in use
    Conflict,
    /// Out-of-bounds values, malformed operations or documents
    Invalid,
    /// A calc that depends on itself
    Cycle,
}

/// Game value manager errors
#[derive(Debug, Error)]
pub enum GvmError {
    #[error("no game value with id {0}")]
    IdNotFound(GameValueId),

    #[error("no game value named '{name}' for owner '{owner}'")]
    NameNotFound { name: String, owner: String },

    #[error("no effect named '{0}'")]
    EffectNotFound(String),

    #[error("could not find invocation '{0}'")]
    UnknownReference(String),

    #[error("empty reference in '{0}'")]
    EmptyReference(String),

    #[error("no sheet slot named '{0}'")]
    SlotNotFound(String),

    #[error("sheet slot '{0}' is not bound to a game value")]
    SlotUnbound(String),

    #[error("the name '{name}' is already taken for owner '{owner}'")]
    NameTaken { name: String, owner: String },

    #[error("the effect name '{0}' is already taken")]
    EffectTaken(String),

    #[error("'{0}' is a reserved string")]
    Reserved(String),

    #[error("'{name}' is an input of '{dependent}'")]
    InUse { name: String, dependent: String },

    #[error("game value {id} belongs to '{actual}', not '{requested}'")]
    OwnerMismatch {
        id: GameValueId,
        requested: String,
        actual: String,
    },

    #[error("sheet slot '{0}' already exists")]
    SlotTaken(String),

    #[error("sheet templates cannot be modified")]
    TemplateReadOnly,

    #[error("invalid name '{0}'")]
    InvalidName(String),

    #[error("value '{value}' does not conform to scalar threshold ({min} - {max})")]
    OutOfBounds { value: f64, min: f64, max: f64 },

    #[error("invalid scalar threshold ({min} - {max})")]
    InvalidBounds { min: f64, max: f64 },

    #[error("'{0}' is not a scalar")]
    NotScalar(String),

    #[error("'{input}' is listed more than once as an input of '{name}'")]
    DuplicateInput { name: String, input: String },

    #[error("operation '{0}' has no operands")]
    NoOperands(String),

    #[error("slot '{slot}' expects a {expected} value, '{name}' is a {found}")]
    SlotKindMismatch {
        slot: String,
        expected: String,
        name: String,
        found: String,
    },

    #[error("unknown import category '{0}'")]
    UnknownCategory(String),

    #[error("could not import {category} entry #{index} {entry}: {source}")]
    Import {
        category: String,
        index: usize,
        entry: String,
        #[source]
        source: Box<GvmError>,
    },

    #[error("cycle detected while invoking '{0}'")]
    Cycle(String),

    #[error(transparent)]
    Dice(#[from] DiceError),

    #[error("malformed import document: {0}")]
    Json(#[from] serde_json::Error),
}

impl GvmError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GvmError::IdNotFound(_)
            | GvmError::NameNotFound { .. }
            | GvmError::EffectNotFound(_)
            | GvmError::UnknownReference(_)
            | GvmError::SlotNotFound(_)
            | GvmError::SlotUnbound(_) => ErrorKind::NotFound,

            GvmError::NameTaken { .. }
            | GvmError::EffectTaken(_)
            | GvmError::Reserved(_)
            | GvmError::InUse { .. }
            | GvmError::OwnerMismatch { .. }
            | GvmError::SlotTaken(_)
            | GvmError::TemplateReadOnly => ErrorKind::Conflict,

            GvmError::EmptyReference(_)
            | GvmError::InvalidName(_)
            | GvmError::OutOfBounds { .. }
            | GvmError::InvalidBounds { .. }
            | GvmError::NotScalar(_)
            | GvmError::DuplicateInput { .. }
            | GvmError::NoOperands(_)
            | GvmError::SlotKindMismatch { .. }
            | GvmError::UnknownCategory(_)
            | GvmError::Dice(_)
            | GvmError::Json(_) => ErrorKind::Invalid,

            GvmError::Cycle(_) => ErrorKind::Cycle,

            GvmError::Import { source, .. } => source.kind(),
        }
    }
}

pub type Result<T, E = GvmError> = std::result::Result<T, E>;
