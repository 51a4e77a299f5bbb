//! Headless registration wizard.
//!
//! Tracks the active step and the in-memory form values, and gives
//! per-field feedback with the same checks the server runs: the schema rules
//! from `validation` and the boundary format checks from `payload`.
//! Rendering is left to whatever front end drives it.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::payload::{shape_error, SubmissionPayload};
use crate::schema::{FieldRule, SchemaProvider};
use crate::types::{FieldDefinition, FormData, StepDefinition};
use crate::validation::{validate_field, ValidationMode};

pub const PINCODE_FIELD: &str = "pincode";
pub const STATE_FIELD: &str = "state";
pub const CITY_FIELD: &str = "city";

static PINCODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").unwrap());

/// Location details returned by a PIN code lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostalLocation {
    pub state: Option<String>,
    pub block: Option<String>,
    pub district: Option<String>,
}

pub struct Wizard {
    schema: Arc<SchemaProvider>,
    active_step: u32,
    form_data: FormData,
    errors: BTreeMap<String, String>,
    submitted: bool,
}

impl Wizard {
    pub fn new(schema: Arc<SchemaProvider>) -> Self {
        let active_step = schema.first_step().unwrap_or(1);
        Self {
            schema,
            active_step,
            form_data: FormData::new(),
            errors: BTreeMap::new(),
            submitted: false,
        }
    }

    pub fn schema(&self) -> &SchemaProvider {
        &self.schema
    }

    pub fn active_step(&self) -> u32 {
        self.active_step
    }

    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.schema.get_step(self.active_step)
    }

    pub fn form_data(&self) -> &FormData {
        &self.form_data
    }

    pub fn value(&self, field: &str) -> &str {
        self.form_data.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Store a value and refresh that field's error message.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.form_data.insert(field.to_string(), value.into());
        self.refresh_error(field);
    }

    fn refresh_error(&mut self, field: &str) {
        let message = self
            .schema
            .rule(self.active_step, field)
            .and_then(|rule| field_error(rule, self.value(field)));
        match message {
            Some(message) => {
                self.errors.insert(field.to_string(), message);
            }
            None => {
                self.errors.remove(field);
            }
        }
    }

    /// Every field on the current step passes the complete-mode rules.
    pub fn can_continue(&self) -> bool {
        if self.current_step().is_none() {
            return false;
        }
        self.schema
            .rules_for_step(self.active_step)
            .iter()
            .all(|rule| field_error(rule, self.value(rule.name())).is_none())
    }

    pub fn is_last_step(&self) -> bool {
        self.schema.next_step(self.active_step).is_none()
    }

    /// Advance to the next declared step. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        match self.schema.next_step(self.active_step) {
            Some(next) if self.can_continue() => {
                self.active_step = next;
                true
            }
            _ => false,
        }
    }

    /// Go back one declared step, never before the first. Returns whether the step changed.
    pub fn back(&mut self) -> bool {
        match self.schema.previous_step(self.active_step) {
            Some(previous) => {
                self.active_step = previous;
                true
            }
            None => false,
        }
    }

    /// Share of the form reached, as a rounded percentage.
    pub fn progress_percent(&self) -> u32 {
        let total = self.schema.step_count();
        let Some(position) = self.schema.step_position(self.active_step) else {
            return 0;
        };
        (((position + 1) as f64 / total as f64) * 100.0).round() as u32
    }

    /// Fields the front end should render for the current step.
    pub fn visible_fields(&self) -> &[FieldDefinition] {
        self.schema.get_fields_for_step(self.active_step)
    }

    /// Body for `POST /api/submit`: the active step plus every non-empty
    /// value entered so far, earlier steps included.
    pub fn submission_payload(&self) -> SubmissionPayload {
        let data = self
            .form_data
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        SubmissionPayload::new(self.active_step, data)
    }

    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    /// Start a new registration from the first step.
    pub fn reset(&mut self) {
        self.submitted = false;
        self.form_data.clear();
        self.errors.clear();
        self.active_step = self.schema.first_step().unwrap_or(1);
    }

    /// The PIN code to look up, once the entered value is well formed.
    pub fn pincode_for_lookup(&self) -> Option<&str> {
        let pin = self.value(PINCODE_FIELD);
        PINCODE_RE.is_match(pin).then_some(pin)
    }

    /// Prefill state and city from a lookup. Existing values are kept
    /// whenever the lookup has nothing for them.
    pub fn apply_postal_location(&mut self, location: &PostalLocation) {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

        if let Some(state) = non_empty(&location.state) {
            self.set_value(STATE_FIELD, state);
        }
        if let Some(city) = non_empty(&location.block).or_else(|| non_empty(&location.district)) {
            self.set_value(CITY_FIELD, city);
        }
    }
}

/// Schema rule first, then the boundary format check the server applies to
/// `aadhaar`, `otp` and `pan`.
fn field_error(rule: &FieldRule, value: &str) -> Option<String> {
    validate_field(rule, value, ValidationMode::Complete).or_else(|| {
        (!value.is_empty() && shape_error(rule.name(), value).is_some())
            .then(|| format!("{} format is invalid", rule.label()))
    })
}
