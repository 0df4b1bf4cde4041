//! Build variable validation
//!
//! Variables are opaque name/value pairs handed to the executor. Only their
//! shape is checked here; lengths are counted in characters, not bytes.

use std::collections::HashMap;

use super::error::ServiceError;

pub const MAX_VARIABLES: usize = 100;
pub const MAX_KEY_LEN: usize = 128;
pub const MAX_VALUE_LEN: usize = 4096;

/// Why a variable map was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariableError {
    #[error("too many variables: {count} (max {max})", max = MAX_VARIABLES)]
    TooMany { count: usize },

    #[error("variable name cannot be empty")]
    EmptyKey,

    #[error("variable name '{key}' is too long (max {max} characters)", max = MAX_KEY_LEN)]
    KeyTooLong { key: String },

    #[error("value of variable '{key}' is too long (max {max} characters)", max = MAX_VALUE_LEN)]
    ValueTooLong { key: String },
}

impl From<VariableError> for ServiceError {
    fn from(err: VariableError) -> Self {
        ServiceError::InvalidArgument(format!("invalid variables: {err}"))
    }
}

/// Validate trigger variables and return an owned copy.
///
/// Each rule is checked across the whole map before the next one, so the
/// reported violation does not depend on map iteration order between rules.
pub fn validate_variables(
    variables: Option<&HashMap<String, String>>,
) -> Result<HashMap<String, String>, VariableError> {
    let Some(variables) = variables.filter(|v| !v.is_empty()) else {
        return Ok(HashMap::new());
    };

    if variables.len() > MAX_VARIABLES {
        return Err(VariableError::TooMany {
            count: variables.len(),
        });
    }

    if variables.keys().any(|k| k.is_empty()) {
        return Err(VariableError::EmptyKey);
    }

    if let Some(key) = variables.keys().find(|k| k.chars().count() > MAX_KEY_LEN) {
        return Err(VariableError::KeyTooLong {
            key: truncate(key),
        });
    }

    if let Some((key, _)) = variables
        .iter()
        .find(|(_, v)| v.chars().count() > MAX_VALUE_LEN)
    {
        return Err(VariableError::ValueTooLong { key: truncate(key) });
    }

    Ok(variables.clone())
}

// Keeps error messages readable when a key is huge
fn truncate(key: &str) -> String {
    const SHOWN: usize = 32;
    if key.chars().count() <= SHOWN {
        key.to_string()
    } else {
        let head: String = key.chars().take(SHOWN).collect();
        format!("{head}...")
    }
}
