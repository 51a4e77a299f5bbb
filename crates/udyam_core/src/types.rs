//! Form schema and submission data types.
//!
//! The JSON shape of `FormSchema` is the artifact written by the scraper and
//! served at `GET /api/schema`:
//!
//! ```text
//! { "steps": [ { "step", "title", "fields": [ { "name", "label", "type",
//!                                               "required", "pattern"?, "options"? } ] } ] }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::payload::SubmissionPayload;

/// Flat mapping of field name to user-entered value.
pub type FormData = BTreeMap<String, String>;

/// Input widget type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Tel,
    Number,
}

/// Definition of a single input within a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Field identifier, also the key in `FormData`
    pub name: String,

    /// Human-readable label, used in error messages
    pub label: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Regular expression the whole value must match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Enumerated choices; the field renders as a select when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl FieldDefinition {
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type: FieldType::Text,
            required: false,
            pattern: None,
            options: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_select(&self) -> bool {
        self.options.is_some()
    }
}

/// One screen of the registration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub step: u32,
    pub title: String,
    pub fields: Vec<FieldDefinition>,
}

impl StepDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The ordered collection of steps describing the whole form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormSchema {
    pub steps: Vec<StepDefinition>,
}

impl FormSchema {
    pub fn step(&self, step: u32) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.step == step)
    }

    pub fn field_count(&self) -> usize {
        self.steps.iter().map(|s| s.fields.len()).sum()
    }
}

/// Values extracted from an accepted payload, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewSubmission {
    pub step: u32,
    pub aadhaar: Option<String>,
    pub mobile: Option<String>,
    pub otp: Option<String>,
    pub pan: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    /// Serialized copy of the full submitted `data` object
    pub raw_json: String,
}

impl NewSubmission {
    pub fn from_payload(payload: &SubmissionPayload) -> Result<Self, serde_json::Error> {
        let data = &payload.data;
        let column = |key: &str| data.get(key).cloned();
        Ok(Self {
            step: payload.step,
            aadhaar: column("aadhaar"),
            mobile: column("mobile"),
            otp: column("otp"),
            pan: column("pan"),
            pincode: column("pincode"),
            state: column("state"),
            city: column("city"),
            raw_json: serde_json::to_string(&payload.raw_data())?,
        })
    }
}

/// A persisted submission row. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub step: u32,
    pub aadhaar: Option<String>,
    pub mobile: Option<String>,
    pub otp: Option<String>,
    pub pan: Option<String>,
    pub pincode: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub raw_json: String,
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn from_new(id: Uuid, created_at: DateTime<Utc>, new: NewSubmission) -> Self {
        Self {
            id,
            step: new.step,
            aadhaar: new.aadhaar,
            mobile: new.mobile,
            otp: new.otp,
            pan: new.pan,
            pincode: new.pincode,
            state: new.state,
            city: new.city,
            raw_json: new.raw_json,
            created_at,
        }
    }

    /// Decode `raw_json` back into the submitted `data` object.
    pub fn submitted_data(&self) -> Result<Map<String, Value>, serde_json::Error> {
        serde_json::from_str(&self.raw_json)
    }
}
