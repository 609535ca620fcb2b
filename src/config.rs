//! Manager configuration
//!
//! Layered with figment: built-in defaults, then an optional TOML file, then
//! `GVM_`-prefixed environment variables.

use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::dice::DiceEngine;

/// Default/public owner token
pub const DEFAULT_OWNER: &str = "public";

/// What to do with an import entry that fails to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportPolicy {
    /// Stop at the first bad entry
    #[default]
    FailFast,
    /// Log the bad entry, record it in the summary and continue
    SkipInvalid,
}

/// Game value manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GvmConfig {
    /// Owner used when none is given; also the lookup fallback
    pub default_owner: String,
    /// Strings that may never be a value name or an owner (the default
    /// owner is always reserved in addition to these)
    pub reserved: Vec<String>,
    /// Bulk import behaviour on bad entries
    pub import_policy: ImportPolicy,
    /// Log every substituted expression at info level
    pub log_eval: bool,
    /// Fixed dice seed for reproducible rolls
    pub seed: Option<u64>,
}

impl Default for GvmConfig {
    fn default() -> Self {
        Self {
            default_owner: DEFAULT_OWNER.to_string(),
            reserved: Vec::new(),
            import_policy: ImportPolicy::FailFast,
            log_eval: false,
            seed: None,
        }
    }
}

impl GvmConfig {
    /// Figment with every provider layered in order
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(GvmConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("GVM_"))
    }

    /// Load configuration from defaults, an optional TOML file and the
    /// environment
    pub fn load(path: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(path).extract()
    }

    /// Dice engine honouring the configured seed
    pub fn dice_engine(&self) -> DiceEngine {
        match self.seed {
            Some(seed) => DiceEngine::seeded(seed),
            None => DiceEngine::from_entropy(),
        }
    }

    /// Every reserved string, default owner included
    pub fn reserved_strings(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.default_owner.as_str()).chain(self.reserved.iter().map(String::as_str))
    }
}
