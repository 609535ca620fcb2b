//! Name validation for game values, effects and owners
//!
//! Value and effect names are referenced from expressions as `#NAME`, so they
//! must survive token scanning:
//! - Non-empty
//! - No whitespace, `#`, `(` or `)`
//!
//! This is stricter than plain non-emptiness: a name like "Sleight of Hand"
//! could never be written as a token, so it is rejected at registration
//! (and fails on import) rather than becoming a value no calc can reference.
//! Use "Sleight_of_Hand" or similar instead.
//!
//! Owners only need to be non-empty.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{GvmError, Result};

/// Characters a referenceable name may contain
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s#()]+$").unwrap());

/// Validate a game value or effect name.
///
/// # Examples
/// ```
/// use gvm::names::validate_name;
///
/// assert!(validate_name("D20").is_ok());
/// assert!(validate_name("AMOD_DEX").is_ok());
///
/// assert!(validate_name("").is_err());
/// assert!(validate_name("Sleight of Hand").is_err());
/// assert!(validate_name("#DEX").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        Err(GvmError::InvalidName(name.to_string()))
    }
}

/// Validate an owner key
pub fn validate_owner(owner: &str) -> Result<()> {
    if owner.trim().is_empty() {
        Err(GvmError::InvalidName(owner.to_string()))
    } else {
        Ok(())
    }
}
