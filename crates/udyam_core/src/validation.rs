//! Field validation shared by the wizard and the HTTP boundary.
//!
//! Only fields declared for the step are checked; undeclared keys in the
//! submitted data are ignored. A missing required value short-circuits the
//! pattern check for that field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldRule, SchemaProvider};
use crate::types::FormData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Required and pattern checks
    #[default]
    Complete,
    /// Pattern checks only, for per-field feedback while typing
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    fn from_errors(errors: BTreeMap<String, String>) -> Self {
        Self {
            ok: errors.is_empty(),
            errors,
        }
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Check one value against one field rule.
pub fn validate_field(rule: &FieldRule, value: &str, mode: ValidationMode) -> Option<String> {
    if value.is_empty() {
        if mode == ValidationMode::Complete && rule.definition.required {
            return Some(format!("{} is required", rule.label()));
        }
        return None;
    }
    if !rule.matches(value) {
        return Some(format!("{} format is invalid", rule.label()));
    }
    None
}

/// Validate `data` against the fields declared for `step`.
pub fn validate(
    provider: &SchemaProvider,
    step: u32,
    data: &FormData,
    mode: ValidationMode,
) -> ValidationResult {
    let errors = provider
        .rules_for_step(step)
        .iter()
        .filter_map(|rule| {
            let value = data.get(rule.name()).map(String::as_str).unwrap_or("");
            validate_field(rule, value, mode).map(|msg| (rule.name().to_string(), msg))
        })
        .collect();
    ValidationResult::from_errors(errors)
}

/// Checks run before a submission is stored: `step` in complete mode, plus
/// pattern checks on any value supplied for a field of another step.
pub fn validate_submission(
    provider: &SchemaProvider,
    step: u32,
    data: &FormData,
) -> ValidationResult {
    let mut result = validate(provider, step, data, ValidationMode::Complete);
    for rule in provider.rules_outside_step(step) {
        let Some(value) = data.get(rule.name()) else {
            continue;
        };
        if result.errors.contains_key(rule.name()) {
            continue;
        }
        if let Some(msg) = validate_field(rule, value, ValidationMode::Partial) {
            result.errors.insert(rule.name().to_string(), msg);
        }
    }
    result.ok = result.errors.is_empty();
    result
}
