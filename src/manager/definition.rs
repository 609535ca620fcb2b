//! Definitions of values and effects to create
//!
//! These mirror the entries of an import document. Each category key of the
//! document maps to one definition type:
//! - `static` → [`StaticDef`]
//! - `scalar` → [`ScalarDef`]
//! - `die` → [`DieDef`]
//! - `calc` → [`CalcDef`]
//! - `effect` → [`EffectDef`]

use serde::{Deserialize, Serialize};

use crate::error::{GvmError, Result};

/// Fields shared by every game value entry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueHeader {
    #[serde(rename = "baseVal", default)]
    pub base_val: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Effects registered alongside the value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<EffectDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl ValueHeader {
    fn new(name: &str, base_val: f64) -> Self {
        Self {
            base_val,
            name: name.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticDef {
    #[serde(flatten)]
    pub header: ValueHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarDef {
    #[serde(flatten)]
    pub header: ValueHeader,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieDef {
    #[serde(flatten)]
    pub header: ValueHeader,
    pub sides: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalcDef {
    #[serde(flatten)]
    pub header: ValueHeader,
    pub operation: String,
    /// Names of the inputs, resolved under the entry's owner
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectDef {
    pub name: String,
    #[serde(default, with = "ordered_table")]
    pub values: Vec<(String, f64)>,
    pub operation: String,
    #[serde(default)]
    pub target_tags: Vec<String>,
    #[serde(default)]
    pub negate_base: bool,
}

impl StaticDef {
    pub fn new(name: &str, base_val: f64) -> Self {
        Self {
            header: ValueHeader::new(name, base_val),
        }
    }
}

impl ScalarDef {
    pub fn new(name: &str, base_val: f64, min: f64, max: f64) -> Self {
        Self {
            header: ValueHeader::new(name, base_val),
            min,
            max,
        }
    }
}

impl DieDef {
    pub fn new(name: &str, quantity: u32, sides: u32) -> Self {
        Self {
            header: ValueHeader::new(name, 0.0),
            sides,
            quantity,
        }
    }
}

impl CalcDef {
    pub fn new<S: AsRef<str>>(name: &str, operation: &str, inputs: &[S]) -> Self {
        Self {
            header: ValueHeader::new(name, 0.0),
            operation: operation.to_string(),
            values: inputs.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }
}

impl EffectDef {
    pub fn new(name: &str, operation: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
            operation: operation.to_string(),
            target_tags: Vec::new(),
            negate_base: false,
        }
    }

    pub fn with_value(mut self, key: &str, value: f64) -> Self {
        self.values.push((key.to_string(), value));
        self
    }

    pub fn targeting<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.target_tags
            .extend(tags.iter().map(|t| t.as_ref().to_string()));
        self
    }

    pub fn negating(mut self, negate_base: bool) -> Self {
        self.negate_base = negate_base;
        self
    }
}

/// Builder methods shared by the value definitions
macro_rules! value_def_builders {
    ($($def:ty),*) => {$(
        impl $def {
            pub fn owned_by(mut self, owner: &str) -> Self {
                self.header.owner = Some(owner.to_string());
                self
            }

            pub fn tagged<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
                self.header
                    .tags
                    .extend(tags.iter().map(|t| t.as_ref().to_string()));
                self
            }

            pub fn with_effect(mut self, effect: EffectDef) -> Self {
                self.header.effects.push(effect);
                self
            }
        }
    )*};
}

value_def_builders!(StaticDef, ScalarDef, DieDef, CalcDef);

/// Anything the manager can create
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    Static(StaticDef),
    Scalar(ScalarDef),
    Die(DieDef),
    Calc(CalcDef),
    Effect(EffectDef),
}

impl Definition {
    /// Parse one import entry under its category key
    pub fn from_entry(category: &str, entry: &serde_json::Value) -> Result<Self> {
        let definition = match category {
            "static" => Definition::Static(StaticDef::deserialize(entry)?),
            "scalar" => Definition::Scalar(ScalarDef::deserialize(entry)?),
            "die" => Definition::Die(DieDef::deserialize(entry)?),
            "calc" => Definition::Calc(CalcDef::deserialize(entry)?),
            "effect" => Definition::Effect(EffectDef::deserialize(entry)?),
            other => return Err(GvmError::UnknownCategory(other.to_string())),
        };
        Ok(definition)
    }

    pub fn category(&self) -> &'static str {
        match self {
            Definition::Static(_) => "static",
            Definition::Scalar(_) => "scalar",
            Definition::Die(_) => "die",
            Definition::Calc(_) => "calc",
            Definition::Effect(_) => "effect",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Definition::Static(def) => &def.header.name,
            Definition::Scalar(def) => &def.header.name,
            Definition::Die(def) => &def.header.name,
            Definition::Calc(def) => &def.header.name,
            Definition::Effect(def) => &def.name,
        }
    }

    /// Common value fields; `None` for effects
    pub fn header(&self) -> Option<&ValueHeader> {
        match self {
            Definition::Static(def) => Some(&def.header),
            Definition::Scalar(def) => Some(&def.header),
            Definition::Die(def) => Some(&def.header),
            Definition::Calc(def) => Some(&def.header),
            Definition::Effect(_) => None,
        }
    }

    fn header_mut(&mut self) -> Option<&mut ValueHeader> {
        match self {
            Definition::Static(def) => Some(&mut def.header),
            Definition::Scalar(def) => Some(&mut def.header),
            Definition::Die(def) => Some(&mut def.header),
            Definition::Calc(def) => Some(&mut def.header),
            Definition::Effect(_) => None,
        }
    }

    /// Replace the owner of a value definition (effects are unowned)
    pub fn set_owner(&mut self, owner: &str) {
        if let Some(header) = self.header_mut() {
            header.owner = Some(owner.to_string());
        }
    }
}

impl From<StaticDef> for Definition {
    fn from(def: StaticDef) -> Self {
        Definition::Static(def)
    }
}

impl From<ScalarDef> for Definition {
    fn from(def: ScalarDef) -> Self {
        Definition::Scalar(def)
    }
}

impl From<DieDef> for Definition {
    fn from(def: DieDef) -> Self {
        Definition::Die(def)
    }
}

impl From<CalcDef> for Definition {
    fn from(def: CalcDef) -> Self {
        Definition::Calc(def)
    }
}

impl From<EffectDef> for Definition {
    fn from(def: EffectDef) -> Self {
        Definition::Effect(def)
    }
}

/// JSON objects as ordered `(key, value)` lists.
///
/// Arithmetic operations fold in declaration order, so the order of keys in
/// the document has to survive deserialization.
pub(crate) mod ordered_table {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}
